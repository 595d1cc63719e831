//! Mapping of reqwest outcomes onto the core error types.

use std::time::Duration;

use reqwest::header::HeaderValue;
use serde::de::DeserializeOwned;
use tracing::trace;

use bazaar_core::error::{InvalidInputError, ProtocolError, TransportError};
use bazaar_core::{Error, Result};

use crate::endpoints::ErrorResponse;

/// Why a single send did not produce a successful response.
#[derive(Debug)]
pub(crate) enum SendFailure {
    NoResponse(TransportError),
    Status(ProtocolError),
}

impl SendFailure {
    pub(crate) fn outcome(&self) -> bazaar_core::Outcome {
        match self {
            SendFailure::NoResponse(_) => bazaar_core::Outcome::NoResponse,
            SendFailure::Status(e) => bazaar_core::Outcome::Status(e.status),
        }
    }

    pub(crate) fn into_error(self, kind: bazaar_core::ErrorKind) -> Error {
        match self {
            SendFailure::NoResponse(e) => Error::Network(e),
            SendFailure::Status(e) => Error::from_status(kind, e),
        }
    }
}

/// Map a reqwest error for a request that got no usable response.
pub(crate) fn transport_error(err: &reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else if err.is_decode() {
        TransportError::Decode {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    }
}

/// Error for a non-2xx response outside the pipeline: 5xx is a server
/// error, everything else a client error.
pub(crate) fn status_error(error: ProtocolError) -> Error {
    if (500..=599).contains(&error.status) {
        Error::Server(error)
    } else {
        Error::Client(error)
    }
}

/// Send a request, separating "no response" from "error status".
pub(crate) async fn send(
    builder: reqwest::RequestBuilder,
    timeout: Duration,
) -> std::result::Result<reqwest::Response, SendFailure> {
    let response = builder
        .send()
        .await
        .map_err(|e| SendFailure::NoResponse(transport_error(&e, timeout)))?;

    let status = response.status();
    trace!(status = %status, "HTTP response");

    if status.is_success() {
        Ok(response)
    } else {
        Err(SendFailure::Status(parse_error_response(response).await))
    }
}

/// Decode a JSON response body.
pub(crate) async fn decode<R: DeserializeOwned>(
    response: reqwest::Response,
    timeout: Duration,
) -> Result<R> {
    response
        .json::<R>()
        .await
        .map_err(|e| Error::Network(transport_error(&e, timeout)))
}

/// Parse an error response body, tolerating bodies that are not JSON.
async fn parse_error_response(response: reqwest::Response) -> ProtocolError {
    let status = response.status().as_u16();

    match response.json::<ErrorResponse>().await {
        Ok(body) => ProtocolError::new(status, body.error, body.message),
        Err(_) => ProtocolError::new(status, None, None),
    }
}

/// A sensitive `Authorization` header value.
pub(crate) fn bearer_header(value: String) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(&value).map_err(|_| InvalidInputError::TokenHeader)?;
    header.set_sensitive(true);
    Ok(header)
}
