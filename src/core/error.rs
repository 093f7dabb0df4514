//! Authorization error types

use std::time::Duration;

use thiserror::Error;

/// Default message carried by [`AuthError::Unauthorized`]
pub const UNAUTHORIZED_MESSAGE: &str = "User is not authorized to access the resource.";

/// Errors that terminate an authorization decision
///
/// `Unauthenticated` and `Unauthorized` must stay distinguishable at the
/// boundary: the caller either has to log in or has to request access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No valid session or user identity is present
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Identity established, but no filter granted the required permissions
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Misconfiguration detected while constructing a component
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl AuthError {
    /// Create an unauthenticated error
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        AuthError::Unauthenticated(msg.into())
    }

    /// Create an unauthorized error with the default message
    pub fn unauthorized() -> Self {
        AuthError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string())
    }

    /// Create an unauthorized error with a custom message
    pub fn unauthorized_with(msg: impl Into<String>) -> Self {
        AuthError::Unauthorized(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AuthError::InvalidArgument(msg.into())
    }

    /// HTTP status a transport layer should map this error to
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::Unauthenticated(_) => 401,
            AuthError::Unauthorized(_) => 403,
            AuthError::InvalidArgument(_) => 500,
        }
    }

    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated(_) => "unauthenticated",
            AuthError::Unauthorized(_) => "unauthorized",
            AuthError::InvalidArgument(_) => "invalid_argument",
        }
    }
}

/// Result type alias for authorization operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Failures of a single remote permission lookup
///
/// These never reach the caller of a decision. The remote filter logs them
/// and defers to the next filter in the chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorityError {
    /// The lookup did not resolve within the configured bound
    #[error("Remote authority timed out after {0:?}")]
    TimedOut(Duration),

    /// Connection, protocol or status failure talking to the authority
    #[error("Remote authority transport error: {0}")]
    Transport(String),

    /// Anything else (bad payload, panicked future, ...)
    #[error("Remote authority error: {0}")]
    Other(String),
}

impl AuthorityError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        AuthorityError::Transport(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        AuthorityError::Other(msg.into())
    }
}
