//! Traits describing acquisition capabilities and the error taxonomy.

use async_trait::async_trait;

use crate::model::{CacheTtl, Payload, ProviderId, ProviderMeta};

/// Provider error code treated as a routine no-op ("not modified").
///
/// Failures carrying this code are logged at debug level instead of warning.
pub const BENIGN_PROVIDER_CODE: i64 = 2;

#[derive(thiserror::Error, Debug)]
/// Closed taxonomy of acquisition failures.
///
/// Callers match exhaustively; there is no open hierarchy behind this enum.
pub enum AcquisitionError {
    /// Non-2xx response or connection-level failure from the transport.
    #[error("Transport failure (HTTP {status}): {message}")]
    Transport {
        /// HTTP status code, or `999` when no status was available.
        status: u16,
        /// Error body from the provider, or `"Unknown error."` when empty.
        message: String,
    },
    /// Payload could not be parsed as the expected format.
    #[error("Decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Invalid constructor arguments or malformed configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The provider's own payload encodes a structured error.
    #[error("Provider error {code}: {message}")]
    ProviderApi {
        /// Diagnostic code from the provider's error envelope.
        code: i64,
        /// Diagnostic message from the provider's error envelope.
        message: String,
        /// The body the envelope was decoded from, kept for logging.
        raw_body: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Log level a classified error should be reported at.
pub enum Severity {
    /// Routine condition, debug-level observability only.
    Debug,
    /// Anything a station operator should see.
    Warning,
}

impl AcquisitionError {
    /// Classify the log severity of this error.
    ///
    /// Only a provider-embedded error carrying the benign "not modified"
    /// code is demoted to debug; everything else warrants a warning. The
    /// distinction is cosmetic and never changes the error value itself.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            AcquisitionError::ProviderApi { code, .. } if *code == BENIGN_PROVIDER_CODE => {
                Severity::Debug
            }
            _ => Severity::Warning,
        }
    }

    /// Emit this error on the log at its classified severity.
    pub fn report(&self, provider: ProviderId) {
        match self.severity() {
            Severity::Debug => {
                tracing::debug!(provider = provider.as_str(), error = %self, "acquisition failed");
            }
            Severity::Warning => {
                tracing::warn!(provider = provider.as_str(), error = %self, "acquisition failed");
            }
        }
    }
}

#[async_trait]
/// Transport abstraction: perform an HTTP-style GET and return the body.
pub trait Fetcher: Send + Sync {
    /// Retrieve the body behind a fully resolved URL, verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::Transport`] for non-2xx responses and
    /// connection-level failures.
    async fn fetch(&self, url: &str) -> Result<String, AcquisitionError>;
}

#[async_trait]
/// Key → payload store with TTL-based staleness, independent of transport.
pub trait CacheStore: Send + Sync {
    /// Return the payload stored under `key` only while it is younger than
    /// `ttl`; a stale or missing entry yields `None` and is never served.
    async fn fresh(&self, key: &str, ttl: CacheTtl) -> Option<String>;

    /// Unconditionally overwrite the entry under `key`.
    ///
    /// Returns whether the write succeeded.
    async fn store(&self, key: &str, payload: &str) -> bool;
}

#[async_trait]
/// Uniform entry point each provider exposes to the service facade.
pub trait ObservationPort: Send + Sync {
    /// Metadata describing the provider behind this port.
    fn provider(&self) -> &ProviderMeta;

    /// Fetch the provider's current observations through the shared
    /// cache-or-fetch routine.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`AcquisitionError`] unchanged; this layer
    /// never retries and never substitutes defaults.
    async fn observations(&self) -> Result<Payload, AcquisitionError>;
}
