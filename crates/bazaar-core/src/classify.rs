//! Classification of transport outcomes.

use std::fmt;

/// The closed set of failure kinds a request can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No response was received.
    Network,
    /// A non-5xx error status.
    ClientError(u16),
    /// A 5xx status.
    ServerError(u16),
    /// The access token was rejected; recoverable through a refresh.
    AuthExpired,
    /// The session cannot be recovered.
    RefreshFailure,
}

impl ErrorKind {
    /// Message shown to an end user for this kind of failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::Network => "Unable to reach the server. Check your connection.",
            ErrorKind::AuthExpired | ErrorKind::RefreshFailure => {
                "Your session has expired. Please sign in again."
            }
            ErrorKind::ClientError(status) | ErrorKind::ServerError(status) => {
                status_message(*status)
            }
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Network => write!(f, "network"),
            ErrorKind::ClientError(status) => write!(f, "client_error({})", status),
            ErrorKind::ServerError(status) => write!(f, "server_error({})", status),
            ErrorKind::AuthExpired => write!(f, "auth_expired"),
            ErrorKind::RefreshFailure => write!(f, "refresh_failure"),
        }
    }
}

/// What came back from a single send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Connection refused, DNS failure, timeout.
    NoResponse,
    /// A response with a non-success status.
    Status(u16),
}

/// Classify a failed send.
///
/// `auth_retried` is true once the request has been replayed after a
/// session refresh; a second 401 is then terminal.
pub fn classify(outcome: Outcome, auth_retried: bool) -> ErrorKind {
    match outcome {
        Outcome::NoResponse => ErrorKind::Network,
        Outcome::Status(401) if auth_retried => ErrorKind::RefreshFailure,
        Outcome::Status(401) => ErrorKind::AuthExpired,
        Outcome::Status(status @ 500..=599) => ErrorKind::ServerError(status),
        Outcome::Status(status) => ErrorKind::ClientError(status),
    }
}

/// User-facing message for an HTTP status.
pub fn status_message(status: u16) -> &'static str {
    match status {
        400 => "The request was invalid. Please check your input.",
        401 => "Your session has expired. Please sign in again.",
        403 => "You do not have permission to perform this action.",
        404 => "The requested resource was not found.",
        409 => "This action conflicts with the current state of the resource.",
        422 => "Some of the submitted data is invalid.",
        429 => "Too many requests. Please wait a moment and try again.",
        500 => "The server encountered an error. Please try again later.",
        503 => "The service is temporarily unavailable. Please try again later.",
        _ => "Something went wrong. Please try again.",
    }
}
