//! Error types for the bazaar client.
//!
//! Every request that fails is reported with exactly one [`Error`]. The
//! variants that describe a transport outcome map onto the closed
//! [`ErrorKind`] taxonomy used by the retry and refresh machinery.

use std::fmt;
use thiserror::Error;

use crate::classify::ErrorKind;

/// The unified error type for bazaar operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No response was received (DNS, connection, TLS, timeout).
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// The server rejected the request with a non-5xx status.
    #[error("client error: {0}")]
    Client(ProtocolError),

    /// The server failed with a 5xx status.
    #[error("server error: {0}")]
    Server(ProtocolError),

    /// The access token was rejected and no refresh was attempted.
    #[error("authentication expired: {0}")]
    AuthExpired(ProtocolError),

    /// The session could not be renewed, or the renewed session was rejected.
    #[error("session refresh failed: {0}")]
    RefreshFailure(#[from] AuthError),

    /// Input validation errors (base URL, header values).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Build the error for a failed response given its classification.
    ///
    /// A response always carries a status, so `Network` cannot occur here
    /// and falls back to `Client`.
    pub fn from_status(kind: ErrorKind, error: ProtocolError) -> Self {
        match kind {
            ErrorKind::ServerError(_) => Error::Server(error),
            ErrorKind::AuthExpired => Error::AuthExpired(error),
            ErrorKind::RefreshFailure => Error::RefreshFailure(AuthError::ReplayRejected {
                status: error.status,
            }),
            ErrorKind::ClientError(_) | ErrorKind::Network => Error::Client(error),
        }
    }

    /// The classified kind of this error.
    ///
    /// Returns `None` for input errors raised before anything was sent.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Network(_) => Some(ErrorKind::Network),
            Error::Client(e) => Some(ErrorKind::ClientError(e.status)),
            Error::Server(e) => Some(ErrorKind::ServerError(e.status)),
            Error::AuthExpired(_) => Some(ErrorKind::AuthExpired),
            Error::RefreshFailure(_) => Some(ErrorKind::RefreshFailure),
            Error::InvalidInput(_) => None,
        }
    }

    /// HTTP status carried by this error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Client(e) | Error::Server(e) | Error::AuthExpired(e) => Some(e.status),
            Error::RefreshFailure(AuthError::ReplayRejected { status })
            | Error::RefreshFailure(AuthError::RefreshRejected { status }) => Some(*status),
            _ => None,
        }
    }

    /// A short message suitable for showing to an end user.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            Some(kind) => kind.user_message(),
            None => "The request could not be sent.",
        }
    }
}

/// Transport-level errors: no HTTP response was received.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The response body could not be read or decoded.
    #[error("could not decode response: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
///
/// Cloned to every caller waiting on a refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No refresh token is stored.
    #[error("no refresh token available")]
    RefreshTokenMissing,

    /// The refresh endpoint rejected the refresh token.
    #[error("refresh rejected with HTTP {status}")]
    RefreshRejected { status: u16 },

    /// The refresh endpoint could not be reached.
    #[error("refresh endpoint unreachable: {message}")]
    RefreshUnreachable { message: String },

    /// A request replayed with a renewed token was rejected again.
    #[error("request rejected after session renewal (HTTP {status})")]
    ReplayRejected { status: u16 },

    /// The session was cleared by an earlier failed refresh.
    #[error("session has been cleared")]
    SessionCleared,

    /// The caller owning the refresh went away before it settled.
    #[error("refresh abandoned before completion")]
    RefreshAbandoned,
}

impl AuthError {
    /// Convert the outcome of a failed refresh call.
    pub fn from_refresh_error(err: &Error) -> Self {
        match err {
            Error::RefreshFailure(auth) => auth.clone(),
            other => match other.status() {
                Some(status) => AuthError::RefreshRejected { status },
                None => AuthError::RefreshUnreachable {
                    message: other.to_string(),
                },
            },
        }
    }
}

/// Protocol-level errors parsed from a non-success response.
#[derive(Debug, Clone)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code (if present).
    pub error: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401
    }
}

/// Input validation errors.
#[derive(Debug, Clone, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// A token contains characters that cannot appear in a header.
    #[error("token is not a valid header value")]
    TokenHeader,

    /// Invalid configuration value.
    #[error("invalid configuration '{key}': {reason}")]
    Config { key: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_variant() {
        let err = Error::from_status(
            ErrorKind::ClientError(404),
            ProtocolError::new(404, None, None),
        );
        assert_eq!(err.kind(), Some(ErrorKind::ClientError(404)));
        assert_eq!(err.status(), Some(404));

        let err = Error::from_status(
            ErrorKind::ServerError(503),
            ProtocolError::new(503, None, None),
        );
        assert_eq!(err.kind(), Some(ErrorKind::ServerError(503)));
    }

    #[test]
    fn second_unauthorized_becomes_refresh_failure() {
        let err = Error::from_status(
            ErrorKind::RefreshFailure,
            ProtocolError::new(401, None, None),
        );
        assert!(matches!(
            err,
            Error::RefreshFailure(AuthError::ReplayRejected { status: 401 })
        ));
        assert_eq!(err.kind(), Some(ErrorKind::RefreshFailure));
    }

    #[test]
    fn refresh_error_conversion() {
        let rejected = Error::Client(ProtocolError::new(400, None, None));
        assert_eq!(
            AuthError::from_refresh_error(&rejected),
            AuthError::RefreshRejected { status: 400 }
        );

        let unreachable = Error::Network(TransportError::Connection {
            message: "refused".into(),
        });
        assert!(matches!(
            AuthError::from_refresh_error(&unreachable),
            AuthError::RefreshUnreachable { .. }
        ));
    }

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::new(
            422,
            Some("ValidationFailed".into()),
            Some("title is required".into()),
        );
        assert_eq!(
            err.to_string(),
            "HTTP 422 [ValidationFailed]: title is required"
        );
    }

    #[test]
    fn input_errors_have_no_kind() {
        let err = Error::InvalidInput(InvalidInputError::TokenHeader);
        assert_eq!(err.kind(), None);
        assert_eq!(err.user_message(), "The request could not be sent.");
    }
}
