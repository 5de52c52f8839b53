//! Auth context provider.
//!
//! [`AuthProvider`] keeps a local mirror of the identity service's session
//! and serializes sign-in/sign-out calls against it. Consumers reach it
//! through an explicit [`Scope`] tree:
//!
//! ```no_run
//! use std::sync::Arc;
//! use auth_context::{use_auth, use_require_auth, AuthProvider, MemoryIdentityService, Scope};
//!
//! # async fn run() {
//! let provider = AuthProvider::mount(Arc::new(MemoryIdentityService::new())).await;
//! let page = Scope::root().provide(provider.context()).child("page");
//!
//! let auth = use_auth(&page);
//! let _ = auth.sign_in("user@example.com", "secret").await;
//! println!("authenticated: {}", use_require_auth(&page).is_authenticated);
//! # }
//! ```

mod auth_provider;
mod context;
mod guard;
mod hooks;
mod scope;

pub use auth_provider::AuthProvider;
pub use context::AuthContext;
pub use hooks::{try_use_auth, use_auth, use_require_auth, RequireAuth};
pub use scope::Scope;
