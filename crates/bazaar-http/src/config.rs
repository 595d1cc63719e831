//! Client configuration.

use std::time::Duration;

use reqwest::Method;

use bazaar_core::backoff::{DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY};
use bazaar_core::error::InvalidInputError;
use bazaar_core::{ApiUrl, BackoffPolicy, Result};

/// Environment variable holding the API base URL.
pub const API_URL_ENV: &str = "BAZAAR_API_URL";

/// Environment variable overriding the request timeout, in seconds.
pub const TIMEOUT_ENV: &str = "BAZAAR_TIMEOUT_SECS";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Which requests the pipeline retries after a network or server failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryScope {
    /// Retry every method, including non-idempotent writes.
    #[default]
    AllMethods,
    /// Retry only methods that are safe to repeat.
    IdempotentOnly,
}

impl RetryScope {
    /// Whether requests with `method` are retried by default.
    pub fn allows(&self, method: &Method) -> bool {
        match self {
            RetryScope::AllMethods => true,
            RetryScope::IdempotentOnly => matches!(
                *method,
                Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS
            ),
        }
    }
}

/// Settings for an [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Every request path is resolved against this URL.
    pub base_url: ApiUrl,
    /// Default per-request timeout.
    pub timeout: Duration,
    /// Attempts per logical request for network and server failures.
    pub max_attempts: u32,
    /// Delay before the first retry; doubled for each further retry.
    pub backoff_base: Duration,
    /// Ceiling for a single retry delay.
    pub max_backoff: Duration,
    pub retry_scope: RetryScope,
    /// Route handed to the navigator when the session is lost.
    pub login_route: String,
}

impl ClientConfig {
    /// Configuration with defaults for everything but the base URL.
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base: DEFAULT_BASE_DELAY,
            max_backoff: DEFAULT_MAX_DELAY,
            retry_scope: RetryScope::default(),
            login_route: "/login".to_string(),
        }
    }

    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Fails if `BAZAAR_API_URL` is missing or invalid, or if
    /// `BAZAAR_TIMEOUT_SECS` is not a positive integer.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(API_URL_ENV).ok_or_else(|| InvalidInputError::Config {
            key: API_URL_ENV.to_string(),
            reason: "not set".to_string(),
        })?;
        let mut config = Self::new(ApiUrl::new(base_url.trim())?);

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| InvalidInputError::Config {
                    key: TIMEOUT_ENV.to_string(),
                    reason: format!("expected a positive number of seconds, got '{}'", raw),
                })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, max_attempts: u32, base: Duration, max: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.backoff_base = base;
        self.max_backoff = max;
        self
    }

    pub fn with_retry_scope(mut self, retry_scope: RetryScope) -> Self {
        self.retry_scope = retry_scope;
        self
    }

    pub fn with_login_route(mut self, login_route: impl Into<String>) -> Self {
        self.login_route = login_route.into();
        self
    }

    /// The backoff policy described by this configuration.
    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy::new(self.max_attempts, self.backoff_base, self.max_backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn reads_base_url_and_defaults() {
        let config =
            ClientConfig::from_lookup(lookup(&[(API_URL_ENV, "https://api.example.com")]))
                .unwrap();
        assert_eq!(config.base_url.host(), Some("api.example.com"));
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.backoff_policy().max_attempts(), 3);
        assert_eq!(config.retry_scope, RetryScope::AllMethods);
    }

    #[test]
    fn timeout_override() {
        let config = ClientConfig::from_lookup(lookup(&[
            (API_URL_ENV, "https://api.example.com"),
            (TIMEOUT_ENV, "5"),
        ]))
        .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_missing_url_and_bad_timeout() {
        assert!(ClientConfig::from_lookup(lookup(&[])).is_err());
        assert!(
            ClientConfig::from_lookup(lookup(&[
                (API_URL_ENV, "https://api.example.com"),
                (TIMEOUT_ENV, "0"),
            ]))
            .is_err()
        );
    }

    #[test]
    fn idempotent_scope_excludes_writes() {
        let scope = RetryScope::IdempotentOnly;
        assert!(scope.allows(&Method::GET));
        assert!(scope.allows(&Method::PUT));
        assert!(!scope.allows(&Method::POST));
        assert!(!scope.allows(&Method::PATCH));
        assert!(RetryScope::AllMethods.allows(&Method::POST));
    }
}
