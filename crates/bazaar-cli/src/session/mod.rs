//! Session wiring for the CLI: where the session lives and how failures are
//! shown to the user.

mod ports;
mod storage;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use bazaar_core::ApiUrl;
use bazaar_http::{API_URL_ENV, ApiClient, ClientConfig};

pub use ports::{ConsoleNavigator, ConsoleReporter};
pub use storage::open_store;

/// Connection settings collected from the command line and environment.
#[derive(Debug, Clone, Default)]
pub struct Connection {
    pub api: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Connection {
    fn config(&self) -> Result<ClientConfig> {
        let api = self.api.as_deref().with_context(|| {
            format!("No API URL configured. Pass --api or set {}.", API_URL_ENV)
        })?;
        let base_url = ApiUrl::new(api).context("Invalid API URL")?;

        let mut config = ClientConfig::new(base_url);
        if let Some(secs) = self.timeout_secs.filter(|secs| *secs > 0) {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

/// Build an API client bound to the persisted session.
pub fn connect(connection: &Connection) -> Result<ApiClient> {
    let config = connection.config()?;
    let store = open_store()?;

    ApiClient::builder(config)
        .store(Arc::new(store))
        .reporter(Arc::new(ConsoleReporter))
        .navigator(Arc::new(ConsoleNavigator))
        .build()
        .context("Failed to create API client")
}
