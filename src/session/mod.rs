//! Session data model.
//!
//! Types for the sessions issued by the identity service, the users they
//! carry, and the `AuthState` tuple the provider caches.

mod state;
mod token;
mod user;

pub use state::AuthState;
pub use token::{Session, BEARER};
pub use user::User;
