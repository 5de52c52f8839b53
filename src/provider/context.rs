//! Consumer-facing context value.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use super::auth_provider::Core;
use crate::error::AuthError;
use crate::session::{AuthState, Session, User};

/// The `{ user, session, loading, sign_in, sign_out }` value handed to
/// consumers.
///
/// Cheap to clone. Reads are snapshots; use [`watch`](Self::watch) to be
/// told about every write.
#[derive(Clone)]
pub struct AuthContext {
    core: Arc<Core>,
}

impl AuthContext {
    pub(crate) fn new(core: Arc<Core>) -> Self {
        Self { core }
    }

    /// Snapshot of the whole state.
    pub fn state(&self) -> AuthState {
        self.core.snapshot()
    }

    pub fn user(&self) -> Option<User> {
        self.core.state.borrow().user().cloned()
    }

    pub fn session(&self) -> Option<Session> {
        self.core.state.borrow().session().cloned()
    }

    pub fn loading(&self) -> bool {
        self.core.state.borrow().loading()
    }

    /// Receiver marked changed on every write, including writes that
    /// leave the value as it was.
    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.core.state.subscribe()
    }

    /// See [`AuthProvider::sign_in`](super::AuthProvider::sign_in).
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.core.sign_in(email, password).await
    }

    /// See [`AuthProvider::sign_out`](super::AuthProvider::sign_out).
    pub async fn sign_out(&self) {
        self.core.sign_out().await
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("state", &self.core.snapshot())
            .finish()
    }
}
