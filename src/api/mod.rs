//! HTTP surface for auth-context.
//!
//! Exposes the provider's state over REST and a WebSocket so it can be
//! watched from outside the process.
//!
//! ## Endpoints
//!
//! ### Health & Info
//! - `GET /` - Landing page rendered from the current auth state
//! - `GET /health` - Health check
//! - `GET /api/v1/` - API information
//!
//! ### Auth
//! - `GET /api/v1/auth` - Current auth state
//! - `GET /api/v1/auth/require` - `{is_authenticated, user, loading}` view
//! - `POST /api/v1/auth/sign-in` - Exchange credentials
//! - `POST /api/v1/auth/sign-out` - End the session
//! - `WS /api/v1/auth/ws` - Stream of state changes
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use auth_context::api::{serve, AppState, ServerConfig};
//! use auth_context::{AuthProvider, MemoryIdentityService};
//!
//! #[tokio::main]
//! async fn main() -> auth_context::Result<()> {
//!     let provider = AuthProvider::mount(Arc::new(MemoryIdentityService::new())).await;
//!     let config = ServerConfig::new("127.0.0.1", 3000);
//!     serve(config, AppState::new(provider.context())).await
//! }
//! ```

pub mod handlers;
pub mod router;
pub mod types;
pub mod websocket;

// Re-export commonly used types
pub use handlers::AppState;
pub use router::{create_router, serve, serve_listener, ServerConfig};
pub use types::{ClientMessage, ErrorBody, ServerMessage, SignInRequest, SignInResponse};
