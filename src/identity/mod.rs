//! Identity service contract.
//!
//! The identity service is the system of record for credentials and
//! sessions. The auth provider only ever talks to it through
//! [`IdentityService`]:
//!
//! - `get_session` - one-shot read of the current session
//! - `on_auth_state_change` - push notifications, released via [`Subscription`]
//! - `sign_in_with_password` / `sign_out` - mutations
//!
//! [`MemoryIdentityService`] is an in-process implementation used by the
//! demo server and the tests.

mod events;
mod id;
mod memory;
mod registry;
mod subscription;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AuthError;
use crate::session::{Session, User};

pub use events::AuthChangeEvent;
pub use id::SubscriptionId;
pub use memory::{IdentityOptions, MemoryIdentityService};
pub use registry::ListenerRegistry;
pub use subscription::Subscription;

/// Callback invoked for every auth-state change.
pub type AuthListener = Arc<dyn Fn(AuthChangeEvent, Option<Session>) + Send + Sync>;

/// Result of a successful credential exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignIn {
    /// The authenticated user.
    pub user: User,
    /// The session issued for that user.
    pub session: Session,
}

/// Hosted identity service as seen by the auth provider.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Fetch the current session, if any.
    async fn get_session(&self) -> Result<Option<Session>, AuthError>;

    /// Register a listener for session changes.
    ///
    /// Notifications are delivered in the order the service emits them.
    /// The listener stays registered until the returned handle is released.
    fn on_auth_state_change(&self, listener: AuthListener) -> Subscription;

    /// Exchange an email/password pair for a session.
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> Result<SignIn, AuthError>;

    /// Revoke the current session.
    async fn sign_out(&self) -> Result<(), AuthError>;
}
