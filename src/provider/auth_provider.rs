//! Auth context provider.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use futures_util::FutureExt;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::guard::LoadingGuard;
use super::AuthContext;
use crate::error::AuthError;
use crate::identity::{AuthChangeEvent, AuthListener, IdentityService, Subscription};
use crate::session::{AuthState, Session};

/// State shared between the provider and the contexts it hands out.
pub(crate) struct Core {
    identity: Arc<dyn IdentityService>,
    pub(crate) state: watch::Sender<AuthState>,
    mounted: AtomicBool,
    initialized: AtomicBool,
    pub(crate) in_flight: AtomicUsize,
    notifications: AtomicU64,
    subscription: Mutex<Option<Subscription>>,
}

impl Core {
    pub(crate) fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub(crate) fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Mirror a change notification. Clears `loading` even while a guarded
    /// sign-in or sign-out is still in flight.
    fn apply_change(&self, event: AuthChangeEvent, session: Option<Session>) {
        if !self.is_mounted() {
            debug!("Ignoring {} after teardown", event);
            return;
        }

        let email = session.as_ref().map(|s| s.user.email.clone());
        info!("Auth state changed: {} {:?}", event, email);
        match event {
            AuthChangeEvent::SignedIn => {
                info!("User signed in: {}", email.as_deref().unwrap_or("-"))
            }
            AuthChangeEvent::SignedOut => info!("User signed out"),
            AuthChangeEvent::TokenRefreshed => {}
        }

        self.notifications.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|state| {
            state.set_session(session);
            state.set_loading(false);
        });
    }

    pub(crate) async fn sign_in(
        self: &Arc<Self>,
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        let _loading = LoadingGuard::acquire(self);

        match catch_panics(self.identity.sign_in_with_password(email, password)).await {
            Ok(signed_in) => {
                info!("Sign in successful: {}", signed_in.user.email);
                Ok(())
            }
            Err(AuthError::Unexpected(message)) => {
                error!("Unexpected sign in error: {}", message);
                Err(AuthError::Unexpected(message))
            }
            Err(e) => {
                error!("Sign in error: {}", e);
                Err(e)
            }
        }
    }

    pub(crate) async fn sign_out(self: &Arc<Self>) {
        let _loading = LoadingGuard::acquire(self);

        match catch_panics(self.identity.sign_out()).await {
            Ok(()) => info!("Sign out successful"),
            Err(AuthError::Unexpected(message)) => {
                error!("Unexpected sign out error: {}", message)
            }
            Err(e) => error!("Sign out error: {}", e),
        }
    }
}

/// Owner of the cached auth state.
///
/// Mirrors the identity service's session into an [`AuthState`] and hands
/// out [`AuthContext`] handles to consumers. The provider is the only
/// writer; the identity service's notifications are the source of truth
/// for `user`/`session`.
///
/// Dropping the provider tears it down.
///
/// ```no_run
/// use std::sync::Arc;
/// use auth_context::{AuthProvider, MemoryIdentityService};
///
/// # async fn run() {
/// let identity = Arc::new(MemoryIdentityService::new());
/// let provider = AuthProvider::mount(identity).await;
/// let auth = provider.context();
///
/// if auth.sign_in("user@example.com", "secret").await.is_ok() {
///     println!("signed in as {:?}", auth.user().map(|u| u.email));
/// }
/// # }
/// ```
pub struct AuthProvider {
    core: Arc<Core>,
}

impl AuthProvider {
    /// Create a provider in its initial `{None, None, loading}` state.
    ///
    /// Nothing is fetched or subscribed until [`initialize`](Self::initialize).
    pub fn new(identity: Arc<dyn IdentityService>) -> Self {
        let (state, _) = watch::channel(AuthState::initial());
        Self {
            core: Arc::new(Core {
                identity,
                state,
                mounted: AtomicBool::new(true),
                initialized: AtomicBool::new(false),
                in_flight: AtomicUsize::new(0),
                notifications: AtomicU64::new(0),
                subscription: Mutex::new(None),
            }),
        }
    }

    /// Create and initialize a provider.
    pub async fn mount(identity: Arc<dyn IdentityService>) -> Self {
        let provider = Self::new(identity);
        provider.initialize().await;
        provider
    }

    /// Subscribe to session changes and fetch the initial session.
    ///
    /// A failed fetch is logged and treated as "no session". `loading` is
    /// cleared once the fetch settles either way. If a notification lands
    /// while the fetch is in flight, the notification wins and the fetch
    /// result is discarded. Calling this more than once is a no-op.
    pub async fn initialize(&self) {
        if self.core.initialized.swap(true, Ordering::SeqCst) {
            warn!("Auth provider already initialized");
            return;
        }
        if !self.core.is_mounted() {
            debug!("Skipping initialization of a torn down provider");
            return;
        }

        self.subscribe();

        let seen = self.core.notifications.load(Ordering::SeqCst);
        let session = match catch_panics(self.core.identity.get_session()).await {
            Ok(session) => session,
            Err(e) => {
                error!("Failed to fetch initial session: {}", e);
                None
            }
        };

        if !self.core.is_mounted() {
            debug!("Provider torn down before the initial session arrived");
            return;
        }

        let superseded = self.core.notifications.load(Ordering::SeqCst) != seen;
        if superseded {
            debug!("Initial session superseded by a change notification");
        }
        self.core.state.send_modify(|state| {
            if !superseded {
                state.set_session(session);
            }
            state.set_loading(false);
        });
        info!(
            "Auth provider initialized (authenticated: {})",
            self.core.snapshot().is_authenticated()
        );
    }

    fn subscribe(&self) {
        let core: Weak<Core> = Arc::downgrade(&self.core);
        let listener: AuthListener = Arc::new(
            move |event: AuthChangeEvent, session: Option<Session>| match core.upgrade() {
                Some(core) => core.apply_change(event, session),
                None => debug!("Dropping {} for a released provider", event),
            },
        );
        let subscription = self.core.identity.on_auth_state_change(listener);
        debug!("Auth provider subscribed ({})", subscription.id());

        let mut slot = match self.core.subscription.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = Some(subscription);
    }

    /// Apply a change notification from the identity service.
    ///
    /// Overwrites `user`/`session` with the payload and clears `loading`.
    /// Identical consecutive notifications are not collapsed; every call
    /// notifies every watcher. Ignored after teardown.
    pub fn on_session_changed(&self, event: AuthChangeEvent, session: Option<Session>) {
        self.core.apply_change(event, session);
    }

    /// Exchange credentials with the identity service.
    ///
    /// Returns whether the exchange succeeded. Cached state is NOT updated
    /// here; it follows the `SIGNED_IN` notification.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.core.sign_in(email, password).await
    }

    /// Ask the identity service to end the session.
    ///
    /// Failures are logged, not returned. Cached state follows the
    /// `SIGNED_OUT` notification.
    pub async fn sign_out(&self) {
        self.core.sign_out().await
    }

    /// Release the subscription and stop applying updates.
    ///
    /// Safe to call repeatedly, and before `initialize`.
    pub fn teardown(&self) {
        if self.core.mounted.swap(false, Ordering::SeqCst) {
            info!("Auth provider torn down");
        }

        let subscription = match self.core.subscription.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(mut subscription) = subscription {
            subscription.unsubscribe();
        }
    }

    /// Whether the provider still applies updates.
    pub fn is_mounted(&self) -> bool {
        self.core.is_mounted()
    }

    /// Handle for consumers.
    pub fn context(&self) -> AuthContext {
        AuthContext::new(Arc::clone(&self.core))
    }

    /// Current state snapshot.
    pub fn state(&self) -> AuthState {
        self.core.snapshot()
    }

    /// Receiver that observes every state write.
    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.core.state.subscribe()
    }
}

impl Drop for AuthProvider {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthProvider")
            .field("state", &self.core.snapshot())
            .field("mounted", &self.core.is_mounted())
            .finish()
    }
}

/// Run an identity call, turning a panic into [`AuthError::Unexpected`].
async fn catch_panics<T, F>(call: F) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, AuthError>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(AuthError::Unexpected(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "identity call panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MemoryIdentityService;

    fn identity() -> Arc<MemoryIdentityService> {
        let identity = Arc::new(MemoryIdentityService::new());
        identity.sign_up("user@example.com", "secret").unwrap();
        identity
    }

    #[test]
    fn test_new_provider_is_loading() {
        let provider = AuthProvider::new(identity());
        assert_eq!(provider.state(), AuthState::initial());
        assert!(provider.is_mounted());
    }

    #[tokio::test]
    async fn test_mount_without_session() {
        let provider = AuthProvider::mount(identity()).await;
        assert_eq!(provider.state(), AuthState::from_session(None));
    }

    #[tokio::test]
    async fn test_sign_in_flows_through_notification() {
        let identity = identity();
        let provider = AuthProvider::mount(identity.clone()).await;

        provider.sign_in("user@example.com", "secret").await.unwrap();

        let state = provider.state();
        assert_eq!(state.user().unwrap().email, "user@example.com");
        assert!(!state.loading());
        assert_eq!(
            state.session(),
            identity.get_session().await.unwrap().as_ref()
        );
    }

    #[tokio::test]
    async fn test_sign_out_clears_via_notification() {
        let provider = AuthProvider::mount(identity()).await;
        provider.sign_in("user@example.com", "secret").await.unwrap();

        provider.sign_out().await;

        assert_eq!(provider.state(), AuthState::from_session(None));
    }

    #[tokio::test]
    async fn test_initialize_twice_is_noop() {
        let identity = identity();
        let provider = AuthProvider::mount(identity.clone()).await;
        provider.initialize().await;
        assert_eq!(identity.listener_count(), 1);
    }

    #[tokio::test]
    async fn test_teardown_releases_subscription() {
        let identity = identity();
        let provider = AuthProvider::mount(identity.clone()).await;
        assert_eq!(identity.listener_count(), 1);

        provider.teardown();
        provider.teardown();

        assert!(!provider.is_mounted());
        assert_eq!(identity.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_drop_releases_subscription() {
        let identity = identity();
        let provider = AuthProvider::mount(identity.clone()).await;
        drop(provider);
        assert_eq!(identity.listener_count(), 0);
    }

    #[test]
    fn test_teardown_before_initialize() {
        let provider = AuthProvider::new(identity());
        provider.teardown();
        assert!(!provider.is_mounted());
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");

        let payload: Box<dyn Any + Send> = Box::new(42);
        assert_eq!(panic_message(payload.as_ref()), "identity call panicked");
    }
}
