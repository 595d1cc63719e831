//! The request pipeline.
//!
//! Every call goes through [`ApiClient::execute`]:
//!
//! 1. attach the stored access token (if any) and sanitize the JSON body
//! 2. send; a 2xx response is returned unchanged
//! 3. classify a failure and either back off and resend, renew the session
//!    through the [`RefreshCoordinator`] and resend once, or report and
//!    return the classified error

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use bazaar_core::error::{AuthError, InvalidInputError};
use bazaar_core::{
    AccessToken, BackoffPolicy, Credentials, Error, ErrorKind, MemoryStore, Navigator,
    RefreshCoordinator, Reporter, Result, RetryAttempt, Session, SessionKey, SessionStore,
    TokenRefresher, TracingNavigator, TracingReporter, classify,
};

use crate::auth::AuthApi;
use crate::config::ClientConfig;
use crate::request::{ApiRequest, RequestBody};
use crate::transport::{bearer_header, decode, send};

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    config: ClientConfig,
    store: Option<Arc<dyn SessionStore>>,
    reporter: Option<Arc<dyn Reporter>>,
    navigator: Option<Arc<dyn Navigator>>,
    refresher: Option<Arc<dyn TokenRefresher>>,
}

impl ApiClientBuilder {
    /// Session store; defaults to a [`MemoryStore`].
    pub fn store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Error reporter; defaults to [`TracingReporter`].
    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Navigation port; defaults to [`TracingNavigator`].
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Refresh operation; defaults to the API's `/auth/refresh` endpoint.
    pub fn refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("bazaar/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InvalidInputError::Config {
                key: "http_client".to_string(),
                reason: e.to_string(),
            })?;

        let config = self.config;
        let auth = AuthApi::new(http.clone(), config.base_url.clone(), config.timeout);
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn SessionStore>);
        let navigator = self.navigator.unwrap_or_else(|| {
            Arc::new(TracingNavigator::new(config.login_route.clone())) as Arc<dyn Navigator>
        });
        let refresher = self
            .refresher
            .unwrap_or_else(|| Arc::new(auth.clone()) as Arc<dyn TokenRefresher>);
        let reporter = self
            .reporter
            .unwrap_or_else(|| Arc::new(TracingReporter) as Arc<dyn Reporter>);

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                policy: config.backoff_policy(),
                coordinator: RefreshCoordinator::new(store.clone(), refresher, navigator),
                config,
                store,
                reporter,
                auth,
            }),
        })
    }
}

/// HTTP client for the marketplace API.
///
/// Cheap to clone; clones share the session, the refresh coordinator and
/// the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    config: ClientConfig,
    policy: BackoffPolicy,
    store: Arc<dyn SessionStore>,
    coordinator: RefreshCoordinator,
    reporter: Arc<dyn Reporter>,
    auth: AuthApi,
}

impl ApiClient {
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            store: None,
            reporter: None,
            navigator: None,
            refresher: None,
        }
    }

    /// Client with default collaborators and an in-memory session.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.inner.store
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.inner.coordinator
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        Session::load(self.inner.store.as_ref())
    }

    /// Open a session and persist it.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let output = match self.inner.auth.login(credentials).await {
            Ok(output) => output,
            Err(e) => return Err(self.surface(e)),
        };

        Session::save_login(self.inner.store.as_ref(), &output.tokens, &output.user).map_err(
            |e| InvalidInputError::Other {
                message: format!("user profile is not serializable: {}", e),
            },
        )?;

        info!("Logged in");
        Ok(self.session())
    }

    /// Close the session.
    ///
    /// The server is told on a best-effort basis; the local session is
    /// cleared either way. Safe to call when already logged out.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Some(token) = self.access_token()
            && let Err(e) = self.inner.auth.logout(&token).await
        {
            warn!(error = %e, "Server-side logout failed, clearing local session anyway");
        }
        self.inner.store.clear();
        info!("Logged out");
    }

    /// Renew the session now, sharing any refresh already in flight.
    pub async fn refresh(&self) -> Result<AccessToken> {
        self.inner.coordinator.refresh_now().await
    }

    /// Send a request through the pipeline.
    ///
    /// Resolves with the response on any 2xx status, otherwise with exactly
    /// one classified error, which is also handed to the reporter.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn execute(&self, request: ApiRequest) -> Result<reqwest::Response> {
        let request = request.sanitized();
        let retry_enabled = request
            .retry
            .unwrap_or_else(|| self.inner.config.retry_scope.allows(&request.method));

        let mut attempt = RetryAttempt::default();
        let mut auth_retried = false;
        let mut token = self.access_token();

        loop {
            debug!(attempt = attempt.count, auth_retried, "Sending request");

            let builder = match self.build(&request, token.as_ref()) {
                Ok(builder) => builder,
                Err(e) => return Err(self.surface(e)),
            };

            let failure = match send(builder, self.timeout_for(&request)).await {
                Ok(response) => return Ok(response),
                Err(failure) => failure,
            };

            let kind = classify(failure.outcome(), auth_retried);
            match kind {
                ErrorKind::Network | ErrorKind::ServerError(_)
                    if retry_enabled && self.inner.policy.should_retry(kind, attempt.count) =>
                {
                    let delay = self.inner.policy.delay_for(attempt.count);
                    warn!(
                        %kind,
                        attempt = attempt.count + 1,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt.count += 1;

                    let current = self.access_token();
                    if token.is_some() && current.is_none() {
                        // Torn down by a failed refresh while backing off.
                        debug!("Session cleared during backoff, not resending");
                        return Err(self.surface(AuthError::SessionCleared.into()));
                    }
                    token = current;
                }
                ErrorKind::AuthExpired => {
                    auth_retried = true;
                    debug!("Access token rejected, renewing session");
                    match self.inner.coordinator.renew(token.as_ref()).await {
                        Ok(renewed) => token = Some(renewed),
                        Err(e) => return Err(self.surface(e)),
                    }
                }
                _ => return Err(self.surface(failure.into_error(kind))),
            }
        }
    }

    /// Send a request and decode its JSON response body.
    pub async fn send_json<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R> {
        let timeout = self.timeout_for(&request);
        let response = self.execute(request).await?;
        decode(response, timeout).await
    }

    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.send_json(ApiRequest::get(path)).await
    }

    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(ApiRequest::put(path).json(body)?).await
    }

    pub async fn patch_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(ApiRequest::patch(path).json(body)?).await
    }

    /// Send a DELETE, discarding the response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(ApiRequest::delete(path)).await?;
        Ok(())
    }

    fn access_token(&self) -> Option<AccessToken> {
        self.inner
            .store
            .get(SessionKey::AccessToken)
            .map(AccessToken::new)
    }

    fn timeout_for(&self, request: &ApiRequest) -> std::time::Duration {
        request.timeout.unwrap_or(self.inner.config.timeout)
    }

    fn build(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<reqwest::RequestBuilder> {
        let url = self.inner.config.base_url.endpoint(&request.path);
        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), url)
            .timeout(self.timeout_for(request));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, bearer_header(token.bearer())?);
        }

        builder = match &request.body {
            RequestBody::Empty => {
                builder.header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            }
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(body) => builder.multipart(body.to_form()?),
        };

        Ok(builder)
    }

    /// Hand a terminal error to the reporter and give it back.
    fn surface(&self, error: Error) -> Error {
        self.inner.reporter.report(&error);
        error
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.config.base_url)
            .field("coordinator", &self.inner.coordinator)
            .field("session", &"[REDACTED]")
            .finish()
    }
}
