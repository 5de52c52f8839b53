//! In-process identity service.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info};

use super::{
    AuthChangeEvent, AuthListener, IdentityService, ListenerRegistry, SignIn, Subscription,
};
use crate::error::AuthError;
use crate::session::{Session, User};

/// Tuning for [`MemoryIdentityService`].
#[derive(Debug, Clone)]
pub struct IdentityOptions {
    /// Lifetime of issued access tokens.
    pub session_ttl: Duration,
    /// Artificial delay applied to every async call.
    pub latency: Duration,
}

impl Default for IdentityOptions {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(3600),
            latency: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password: String,
}

/// Identity service that keeps accounts and the current session in memory.
///
/// Holds a single current session, like a browser client of a hosted
/// service: signing in replaces it, signing out clears it, and reading an
/// expired one refreshes it.
pub struct MemoryIdentityService {
    accounts: RwLock<HashMap<String, Account>>,
    current: RwLock<Option<Session>>,
    listeners: Arc<ListenerRegistry>,
    options: IdentityOptions,
}

impl std::fmt::Debug for MemoryIdentityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryIdentityService")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl MemoryIdentityService {
    /// Create a service with default options.
    pub fn new() -> Self {
        Self::with_options(IdentityOptions::default())
    }

    /// Create a service with custom options.
    pub fn with_options(options: IdentityOptions) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
            listeners: Arc::new(ListenerRegistry::new()),
            options,
        }
    }

    /// Register an account.
    pub fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let key = normalize_email(email);
        if key.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let mut accounts = self.accounts.write().map_err(poisoned)?;
        if accounts.contains_key(&key) {
            return Err(AuthError::UserExists(key));
        }

        let user = User::new(key.clone());
        accounts.insert(
            key,
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        info!("Registered account {}", user.email);
        Ok(user)
    }

    /// Number of registered accounts.
    pub fn account_count(&self) -> usize {
        self.accounts.read().map(|a| a.len()).unwrap_or(0)
    }

    /// Number of registered auth-state listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.count()
    }

    /// Replace the current session's tokens.
    pub async fn refresh_session(&self) -> Result<Session, AuthError> {
        self.simulate_latency().await;

        let refreshed = {
            let mut current = self.current.write().map_err(poisoned)?;
            let user = current
                .as_ref()
                .map(|s| s.user.clone())
                .ok_or(AuthError::SessionNotFound)?;
            let session = Session::issue(user, self.ttl());
            *current = Some(session.clone());
            session
        };

        debug!(
            "Refreshed session for {} ({})",
            refreshed.user.email,
            refreshed.token_preview()
        );
        self.emit(AuthChangeEvent::TokenRefreshed, Some(&refreshed))?;
        Ok(refreshed)
    }

    fn ttl(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.options.session_ttl)
            .unwrap_or_else(|_| chrono::Duration::hours(1))
    }

    async fn simulate_latency(&self) {
        if !self.options.latency.is_zero() {
            tokio::time::sleep(self.options.latency).await;
        }
    }

    fn emit(&self, event: AuthChangeEvent, session: Option<&Session>) -> Result<(), AuthError> {
        let delivered = self
            .listeners
            .emit(event, session)
            .map_err(|e| AuthError::Unexpected(e.to_string()))?;
        debug!("Emitted {} to {} listener(s)", event, delivered);
        Ok(())
    }
}

impl Default for MemoryIdentityService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityService for MemoryIdentityService {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        self.simulate_latency().await;

        let current = self.current.read().map_err(poisoned)?.clone();
        match current {
            Some(session) if session.is_expired() => {
                debug!("Session for {} expired, refreshing", session.user.email);
                self.refresh_session().await.map(Some)
            }
            other => Ok(other),
        }
    }

    fn on_auth_state_change(&self, listener: AuthListener) -> Subscription {
        match self.listeners.register(listener) {
            Ok(subscription) => {
                debug!("Registered auth listener {}", subscription.id());
                subscription
            }
            Err(e) => {
                error!("Failed to register auth listener: {}", e);
                Subscription::detached()
            }
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignIn, AuthError> {
        self.simulate_latency().await;

        let key = normalize_email(email);
        if key.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let user = {
            let accounts = self.accounts.read().map_err(poisoned)?;
            match accounts.get(&key) {
                Some(account) if account.password == password => account.user.clone(),
                _ => return Err(AuthError::InvalidCredentials),
            }
        };

        let session = Session::issue(user.clone(), self.ttl());
        *self.current.write().map_err(poisoned)? = Some(session.clone());
        info!("Issued session for {}", user.email);

        self.emit(AuthChangeEvent::SignedIn, Some(&session))?;
        Ok(SignIn { user, session })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.simulate_latency().await;

        let previous = self.current.write().map_err(poisoned)?.take();
        if let Some(session) = &previous {
            info!("Revoked session for {}", session.user.email);
        }

        self.emit(AuthChangeEvent::SignedOut, None)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> AuthError {
    AuthError::Unexpected("internal lock poisoned".into())
}
