//! Auth-state change events.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of change pushed by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthChangeEvent {
    /// A session was established.
    SignedIn,
    /// The session was revoked or expired.
    SignedOut,
    /// The session's tokens were replaced.
    TokenRefreshed,
}

impl AuthChangeEvent {
    /// Wire name of the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignedIn => "SIGNED_IN",
            Self::SignedOut => "SIGNED_OUT",
            Self::TokenRefreshed => "TOKEN_REFRESHED",
        }
    }
}

impl fmt::Display for AuthChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
