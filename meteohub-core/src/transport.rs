//! HTTP transport implementations of the [`Fetcher`] port.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::ports::{AcquisitionError, Fetcher};

/// Sentinel status used when a failure carries no HTTP status at all.
pub const NO_STATUS: u16 = 999;

/// Message substituted when a provider returns an error with an empty body.
pub const UNKNOWN_ERROR: &str = "Unknown error.";

#[derive(Debug, Clone)]
/// Externally supplied transport settings.
///
/// Carried explicitly so no fetcher depends on process-wide state.
pub struct TransportConfig {
    /// Request timeout in whole seconds.
    pub timeout_secs: u64,
    /// Client identifier sent as the `User-Agent` header on every call.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: format!("meteohub/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Map a completed response with a non-2xx status to a transport error.
///
/// The provider's error body becomes the message; an empty body is replaced
/// by [`UNKNOWN_ERROR`], and a missing status by [`NO_STATUS`].
#[must_use]
pub fn classify_response(status: Option<u16>, body: &str) -> AcquisitionError {
    let message = if body.trim().is_empty() {
        String::from(UNKNOWN_ERROR)
    } else {
        String::from(body)
    };

    AcquisitionError::Transport {
        status: status.unwrap_or(NO_STATUS),
        message,
    }
}

/// Map a connection-level failure (DNS, refusal, timeout) to a transport
/// error.
#[must_use]
pub fn classify_connection_error(error: &reqwest::Error) -> AcquisitionError {
    let status = error.status().map(|code| code.as_u16());
    let description = error.to_string();

    AcquisitionError::Transport {
        status: status.unwrap_or(NO_STATUS),
        message: if description.trim().is_empty() {
            String::from(UNKNOWN_ERROR)
        } else {
            description
        },
    }
}

async fn get_body(client: &Client, url: &str) -> Result<String, AcquisitionError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|error| classify_connection_error(&error))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|error| classify_connection_error(&error))?;

    if status.is_success() {
        Ok(body)
    } else {
        Err(classify_response(Some(status.as_u16()), &body))
    }
}

/// Plain HTTP fetcher: configured user-agent and timeout, nothing else.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher from explicit transport settings.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::Configuration`] when the underlying client
    /// cannot be constructed.
    pub fn new(config: &TransportConfig) -> Result<Self, AcquisitionError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| AcquisitionError::Configuration(error.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AcquisitionError> {
        get_body(&self.client, url).await
    }
}

/// HTTP fetcher that sends an arbitrary header map on every request.
///
/// Used for providers whose credentials travel in bespoke headers rather
/// than the URL.
#[derive(Debug, Clone)]
pub struct HeaderFetcher {
    client: Client,
}

impl HeaderFetcher {
    /// Build a fetcher carrying the given `(name, value)` headers.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::Configuration`] when a header name or
    /// value is invalid, or when the underlying client cannot be constructed.
    pub fn new(
        config: &TransportConfig,
        headers: &[(String, String)],
    ) -> Result<Self, AcquisitionError> {
        let mut header_map = HeaderMap::new();

        for (name, value) in headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|error| {
                AcquisitionError::Configuration(format!("Invalid header name '{name}': {error}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|error| {
                AcquisitionError::Configuration(format!("Invalid value for header '{name}': {error}"))
            })?;
            header_map.insert(header_name, header_value);
        }

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(header_map)
            .build()
            .map_err(|error| AcquisitionError::Configuration(error.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HeaderFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AcquisitionError> {
        get_body(&self.client, url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_becomes_the_message() {
        let err = classify_response(Some(404), "not found");

        match err {
            AcquisitionError::Transport { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "not found");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn empty_body_is_replaced_by_the_unknown_sentinel() {
        let err = classify_response(Some(500), "");

        match err {
            AcquisitionError::Transport { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, UNKNOWN_ERROR);
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn missing_status_is_replaced_by_the_sentinel_status() {
        let err = classify_response(None, "   ");

        match err {
            AcquisitionError::Transport { status, message } => {
                assert_eq!(status, NO_STATUS);
                assert_eq!(message, UNKNOWN_ERROR);
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_header_names_fail_at_construction() {
        let config = TransportConfig::default();
        let headers = vec![(String::from("bad header"), String::from("value"))];

        let err = HeaderFetcher::new(&config, &headers).unwrap_err();
        assert!(matches!(err, AcquisitionError::Configuration(_)));
    }
}
