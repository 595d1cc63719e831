//! Calls to the identity endpoints.
//!
//! These bypass the request pipeline: a 401 from login means bad
//! credentials, and a failing refresh must never trigger another refresh.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use tracing::{debug, instrument};

use bazaar_core::{
    AccessToken, ApiUrl, Credentials, RefreshToken, Result, TokenPair, TokenRefresher,
    UserSummary,
};

use crate::endpoints::{LOGIN, LOGOUT, LoginRequest, LoginResponse, REFRESH, RefreshResponse};
use crate::transport::{SendFailure, bearer_header, decode, send, status_error};

/// Tokens and profile returned by a successful login.
#[derive(Debug)]
pub struct LoginOutput {
    pub tokens: TokenPair,
    pub user: UserSummary,
}

/// HTTP client for the identity endpoints.
#[derive(Debug, Clone)]
pub struct AuthApi {
    http: reqwest::Client,
    base_url: ApiUrl,
    timeout: Duration,
}

impl AuthApi {
    pub fn new(http: reqwest::Client, base_url: ApiUrl, timeout: Duration) -> Self {
        Self {
            http,
            base_url,
            timeout,
        }
    }

    /// Exchange credentials for a session.
    #[instrument(skip(self, credentials), fields(api = %self.base_url, email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutput> {
        debug!("Logging in");

        let request = LoginRequest {
            email: credentials.email(),
            password: credentials.password(),
        };
        let builder = self
            .http
            .post(self.base_url.endpoint(LOGIN))
            .timeout(self.timeout)
            .json(&request);

        let response = send(builder, self.timeout).await.map_err(into_error)?;
        let body: LoginResponse = decode(response, self.timeout).await?;

        Ok(LoginOutput {
            tokens: TokenPair {
                access_token: AccessToken::new(body.access_token),
                refresh_token: RefreshToken::new(body.refresh_token),
            },
            user: body.user,
        })
    }

    /// Revoke the session server-side.
    #[instrument(skip(self, access_token), fields(api = %self.base_url))]
    pub async fn logout(&self, access_token: &AccessToken) -> Result<()> {
        debug!("Revoking session");

        let builder = self
            .http
            .post(self.base_url.endpoint(LOGOUT))
            .timeout(self.timeout)
            .header(AUTHORIZATION, bearer_header(access_token.bearer())?);

        send(builder, self.timeout).await.map_err(into_error)?;
        Ok(())
    }
}

#[async_trait]
impl TokenRefresher for AuthApi {
    #[instrument(skip(self, refresh_token), fields(api = %self.base_url))]
    async fn refresh(&self, refresh_token: &RefreshToken) -> Result<TokenPair> {
        debug!("Calling refresh endpoint");

        let builder = self
            .http
            .post(self.base_url.endpoint(REFRESH))
            .timeout(self.timeout)
            .header(AUTHORIZATION, bearer_header(refresh_token.bearer())?);

        let response = send(builder, self.timeout).await.map_err(into_error)?;
        let body: RefreshResponse = decode(response, self.timeout).await?;

        Ok(TokenPair {
            access_token: AccessToken::new(body.access_token),
            refresh_token: body
                .refresh_token
                .map(RefreshToken::new)
                .unwrap_or_else(|| refresh_token.clone()),
        })
    }
}

fn into_error(failure: SendFailure) -> bazaar_core::Error {
    match failure {
        SendFailure::NoResponse(e) => e.into(),
        SendFailure::Status(e) => status_error(e),
    }
}
