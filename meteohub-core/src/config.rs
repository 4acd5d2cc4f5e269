//! TOML-backed configuration surface supplied by the host environment.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{CacheTtl, ProviderId};
use crate::ports::AcquisitionError;
use crate::transport::TransportConfig;

/// Transport settings: the externally supplied timeout and the fixed client
/// identifier sent as user-agent on every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Request timeout in whole seconds.
    pub timeout_secs: u64,
    /// Client identifier string.
    pub user_agent: String,
}

impl Default for TransportSettings {
    fn default() -> Self {
        let defaults = TransportConfig::default();
        Self {
            timeout_secs: defaults.timeout_secs,
            user_agent: defaults.user_agent,
        }
    }
}

/// Credentials and identifiers for a single provider.
///
/// Free-form by design: each provider reads the fields its URL shape needs
/// and ignores the rest.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProviderSettings {
    /// API key, or the composite credential for providers that encode
    /// several fields into one string.
    pub api_key: Option<String>,
    /// OAuth-style access token.
    pub token: Option<String>,
    /// Station or sensor identifier.
    pub station: Option<String>,
    /// Station latitude, for coordinate-based providers.
    pub latitude: Option<f64>,
    /// Station longitude, for coordinate-based providers.
    pub longitude: Option<f64>,
    /// Connection type code for the generic file source (1–5).
    pub connection: Option<u8>,
    /// Resource path or host/path for the generic file source.
    pub resource: Option<String>,
}

/// Top-level configuration.
///
/// Example TOML:
///
/// ```toml
/// cache_ttl = "600"
///
/// [transport]
/// timeout_secs = 15
///
/// [providers.netatmo]
/// token = "..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Transport settings shared by every provider client.
    pub transport: TransportSettings,
    /// Raw cache TTL in seconds; absent means the 600 s default.
    pub cache_ttl: Option<String>,
    /// Per-provider credential tables, keyed by provider slug.
    pub providers: HashMap<String, ProviderSettings>,
}

impl Config {
    /// Parse a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::Configuration`] for malformed TOML.
    pub fn from_toml_str(contents: &str) -> Result<Self, AcquisitionError> {
        toml::from_str(contents)
            .map_err(|error| AcquisitionError::Configuration(error.to_string()))
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::Configuration`] when the file cannot be
    /// read or parsed.
    pub fn load(path: &Path) -> Result<Self, AcquisitionError> {
        let contents = fs::read_to_string(path).map_err(|error| {
            AcquisitionError::Configuration(format!(
                "Failed to read config file {}: {error}",
                path.display()
            ))
        })?;

        Self::from_toml_str(&contents)
    }

    /// The cache TTL, validated before any client is constructed.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::Configuration`] when `cache_ttl` is not a
    /// non-negative integer.
    pub fn ttl(&self) -> Result<CacheTtl, AcquisitionError> {
        match self.cache_ttl.as_deref() {
            Some(raw) => CacheTtl::parse(raw),
            None => Ok(CacheTtl::DEFAULT),
        }
    }

    /// Transport settings as the config value fetcher constructors take.
    #[must_use]
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            timeout_secs: self.transport.timeout_secs,
            user_agent: self.transport.user_agent.clone(),
        }
    }

    /// Settings table for one provider, if configured.
    #[must_use]
    pub fn provider(&self, id: ProviderId) -> Option<&ProviderSettings> {
        self.providers.get(id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_falls_back_to_defaults() {
        let config = Config::from_toml_str("").expect("empty config must parse");

        assert_eq!(config.transport.timeout_secs, 15);
        assert_eq!(config.ttl().expect("default TTL"), CacheTtl::DEFAULT);
        assert!(config.provider(ProviderId::Netatmo).is_none());
    }

    #[test]
    fn provider_tables_are_keyed_by_slug() {
        let config = Config::from_toml_str(
            "[providers.pioupiou]\nstation = \"563\"\n\n[providers.netatmo]\ntoken = \"t0k\"\n",
        )
        .expect("config must parse");

        let pioupiou = config
            .provider(ProviderId::Pioupiou)
            .expect("pioupiou table present");
        assert_eq!(pioupiou.station.as_deref(), Some("563"));

        let netatmo = config
            .provider(ProviderId::Netatmo)
            .expect("netatmo table present");
        assert_eq!(netatmo.token.as_deref(), Some("t0k"));
    }

    #[test]
    fn non_numeric_ttl_is_rejected_before_any_network_access() {
        let config =
            Config::from_toml_str("cache_ttl = \"abc\"\n").expect("document itself is valid");

        let err = config.ttl().unwrap_err();
        assert!(matches!(err, AcquisitionError::Configuration(_)));
    }

    #[test]
    fn transport_table_overrides_defaults() {
        let config = Config::from_toml_str(
            "[transport]\ntimeout_secs = 30\nuser_agent = \"station-probe/2.0\"\n",
        )
        .expect("config must parse");

        let transport = config.transport_config();
        assert_eq!(transport.timeout_secs, 30);
        assert_eq!(transport.user_agent, "station-probe/2.0");
    }
}
