//! API request and response types.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::session::AuthState;

/// Credentials posted to the sign-in endpoint.
///
/// Missing fields deserialize as empty strings; validation is left to the
/// identity service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Error detail returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error code (e.g., "INVALID_CREDENTIALS").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl From<&AuthError> for ErrorBody {
    fn from(err: &AuthError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Response of the sign-in endpoint: `{"error": null}` on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInResponse {
    pub error: Option<ErrorBody>,
}

impl SignInResponse {
    pub fn from_result(result: &Result<(), AuthError>) -> Self {
        Self {
            error: result.as_ref().err().map(ErrorBody::from),
        }
    }
}

/// HTTP status for an identity failure.
pub fn status_for(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
        AuthError::SessionNotFound | AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
        AuthError::UserExists(_) => StatusCode::CONFLICT,
        AuthError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        AuthError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Messages sent by WebSocket clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Exchange credentials.
    SignIn {
        #[serde(default)]
        email: String,
        #[serde(default)]
        password: String,
    },
    /// End the session.
    SignOut,
    /// Keep-alive.
    Ping,
}

/// Messages sent to WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Current auth state, sent on connect and after every change.
    State { state: AuthState },
    /// Outcome of a `sign_in` request.
    SignInResult { error: Option<ErrorBody> },
    /// A `sign_out` request finished.
    SignOutComplete,
    /// Keep-alive response.
    Pong,
    /// Malformed client message.
    Error { code: String, message: String },
}
