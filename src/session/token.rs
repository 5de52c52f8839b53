//! Session token bundle.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::User;

/// Token type issued for every session.
pub const BEARER: &str = "bearer";

/// A session issued by the identity service.
///
/// The provider only ever holds a read-only copy; the identity service owns
/// the tokens and decides when they are refreshed or revoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque access token.
    pub access_token: String,
    /// Opaque refresh token. Never leaves the process.
    #[serde(skip_serializing, default)]
    pub refresh_token: String,
    /// Token type, always `bearer`.
    pub token_type: String,
    /// Expiry instant of the access token.
    pub expires_at: DateTime<Utc>,
    /// User the session was issued for.
    pub user: User,
}

impl Session {
    /// Issue a new session for `user` that expires after `ttl`.
    pub fn issue(user: User, ttl: Duration) -> Self {
        Self {
            access_token: Uuid::new_v4().simple().to_string(),
            refresh_token: Uuid::new_v4().simple().to_string(),
            token_type: BEARER.to_string(),
            expires_at: Utc::now() + ttl,
            user,
        }
    }

    /// Check whether the access token has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Time left until expiry, zero once expired.
    pub fn expires_in(&self) -> Duration {
        (self.expires_at - Utc::now()).max(Duration::zero())
    }

    /// Preview of the access token for logs (first 8 chars).
    pub fn token_preview(&self) -> String {
        if self.access_token.chars().count() > 12 {
            let head: String = self.access_token.chars().take(8).collect();
            format!("{}...", head)
        } else {
            self.access_token.clone()
        }
    }
}
