//! bazaar-http - Resilient authenticated HTTP client for the bazaar API.
//!
//! # Example
//!
//! ```no_run
//! use bazaar_core::Credentials;
//! use bazaar_http::{ApiClient, ClientConfig};
//!
//! # async fn example() -> Result<(), bazaar_core::Error> {
//! let client = ApiClient::new(ClientConfig::from_env()?)?;
//! client.login(&Credentials::new("a@b.com", "hunter2")).await?;
//!
//! let jobs: serde_json::Value = client.get_json("/jobs").await?;
//! println!("{}", jobs);
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod config;
mod endpoints;
mod request;
mod sanitize;
mod transport;

pub use auth::{AuthApi, LoginOutput};
pub use client::{ApiClient, ApiClientBuilder};
pub use config::{API_URL_ENV, ClientConfig, DEFAULT_TIMEOUT, RetryScope, TIMEOUT_ENV};
pub use request::{ApiRequest, FilePart, MultipartBody, RequestBody};
pub use sanitize::{sanitize_str, sanitize_value};

pub use reqwest::{Method, Response, StatusCode};
