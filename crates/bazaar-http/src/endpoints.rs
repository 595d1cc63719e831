//! Identity endpoints and their request/response types.

use serde::{Deserialize, Serialize};

use bazaar_core::UserSummary;

/// POST, exchanges credentials for a session.
pub const LOGIN: &str = "/auth/login";

/// POST, exchanges the refresh token (as bearer) for a new token pair.
pub const REFRESH: &str = "/auth/refresh";

/// POST, best-effort server-side session revocation.
pub const LOGOUT: &str = "/auth/logout";

/// Request body for login.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from login.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserSummary,
}

/// Response from refresh.
///
/// Servers that do not rotate refresh tokens may omit `refresh_token`.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
