//! Error types for auth-context.

use thiserror::Error;

/// Failure reported by the identity service.
///
/// Only `sign_in` surfaces these to its caller; the initial session fetch and
/// `sign_out` log them and carry on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Email/password pair was rejected.
    #[error("invalid login credentials")]
    InvalidCredentials,

    /// Email or password was empty.
    #[error("email and password are required")]
    MissingCredentials,

    /// No session exists to act on.
    #[error("auth session missing")]
    SessionNotFound,

    /// The session expired and could not be refreshed.
    #[error("session expired")]
    SessionExpired,

    /// An account with this email is already registered.
    #[error("user already registered: {0}")]
    UserExists(String),

    /// The identity service could not be reached.
    #[error("identity service unavailable: {0}")]
    Unavailable(String),

    /// The identity call failed in an unexpected way (including a panic).
    #[error("unexpected identity error: {0}")]
    Unexpected(String),
}

impl AuthError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::MissingCredentials => "MISSING_CREDENTIALS",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::UserExists(_) => "USER_EXISTS",
            Self::Unavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Unexpected(_) => "UNEXPECTED",
        }
    }
}

/// Main error type for auth-context operations.
#[derive(Error, Debug)]
pub enum AuthContextError {
    /// Identity service error.
    #[error("identity error: {0}")]
    Identity(#[from] AuthError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,

    /// Configuration could not be applied.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience Result type for auth-context operations.
pub type Result<T> = std::result::Result<T, AuthContextError>;
