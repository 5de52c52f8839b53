//! # auth-context
//!
//! Local mirror of an identity service's session.
//!
//! An [`AuthProvider`] subscribes to an [`IdentityService`], keeps the
//! current user and session in an [`AuthState`], and hands out
//! [`AuthContext`] handles to consumers found through a [`Scope`] tree.
//! Sign-in and sign-out go to the identity service; the cached state only
//! ever changes through the service's change notifications.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use auth_context::{use_auth, AuthProvider, MemoryIdentityService, Scope};
//!
//! #[tokio::main]
//! async fn main() -> auth_context::Result<()> {
//!     // Initialize logging
//!     auth_context::logging::try_init().ok();
//!
//!     let identity = Arc::new(MemoryIdentityService::new());
//!     identity.sign_up("user@example.com", "secret")?;
//!
//!     let provider = AuthProvider::mount(identity).await;
//!     let scope = Scope::root().provide(provider.context()).child("app");
//!
//!     let auth = use_auth(&scope);
//!     auth.sign_in("user@example.com", "secret").await?;
//!     println!("Signed in as {:?}", auth.user().map(|u| u.email));
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod provider;
pub mod session;

// Re-export commonly used types
pub use error::{AuthContextError, AuthError, Result};
pub use identity::{
    AuthChangeEvent, AuthListener, IdentityOptions, IdentityService, MemoryIdentityService,
    SignIn, Subscription, SubscriptionId,
};
pub use provider::{
    try_use_auth, use_auth, use_require_auth, AuthContext, AuthProvider, RequireAuth, Scope,
};
pub use session::{AuthState, Session, User};
