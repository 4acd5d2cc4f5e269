//! Domain data structures for providers, endpoints, payloads, and cache TTLs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ports::AcquisitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Identifier for a weather data source known to meteohub.
pub enum ProviderId {
    /// Ambient Weather network.
    Ambient,
    /// BloomSky sky cameras.
    BloomSky,
    /// Netatmo personal weather stations.
    Netatmo,
    /// OpenWeatherMap city/coordinate observations.
    OpenWeatherMap,
    /// Pioupiou wind sensors.
    Pioupiou,
    /// WeatherFlow smart weather stations.
    WeatherFlow,
    /// Davis WeatherLink consoles.
    WeatherLink,
    /// Generic local or remote file source.
    File,
}

impl ProviderId {
    /// Stable slug used in configuration tables and log lines.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Ambient => "ambient",
            ProviderId::BloomSky => "bloomsky",
            ProviderId::Netatmo => "netatmo",
            ProviderId::OpenWeatherMap => "openweathermap",
            ProviderId::Pioupiou => "pioupiou",
            ProviderId::WeatherFlow => "weatherflow",
            ProviderId::WeatherLink => "weatherlink",
            ProviderId::File => "file",
        }
    }

    /// All known providers, in registration order.
    #[must_use]
    pub const fn all() -> &'static [ProviderId] {
        &[
            ProviderId::Ambient,
            ProviderId::BloomSky,
            ProviderId::Netatmo,
            ProviderId::OpenWeatherMap,
            ProviderId::Pioupiou,
            ProviderId::WeatherFlow,
            ProviderId::WeatherLink,
            ProviderId::File,
        ]
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = AcquisitionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        ProviderId::all()
            .iter()
            .find(|candidate| candidate.as_str() == lower)
            .copied()
            .ok_or_else(|| {
                AcquisitionError::Configuration(format!("Unknown provider '{value}'"))
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Metadata describing a provider and its human-friendly name.
pub struct ProviderMeta {
    /// Unique identifier.
    pub id: ProviderId,
    /// Display name as the service brands itself.
    pub name: String,
}

/// Immutable URL template with `{name}` placeholders.
///
/// Rendering is pure string substitution: no network, no cache, no encoding
/// beyond what the transport performs later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlTemplate {
    template: &'static str,
}

impl UrlTemplate {
    /// Wrap a static endpoint template.
    #[must_use]
    pub const fn new(template: &'static str) -> Self {
        Self { template }
    }

    /// Placeholder names in the order they appear in the template.
    #[must_use]
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut rest = self.template;

        while let Some(open) = rest.find('{') {
            let Some(tail) = rest.get(open + 1..) else {
                break;
            };
            let Some(close) = tail.find('}') else {
                break;
            };
            if let Some(name) = tail.get(..close) {
                names.push(name);
            }
            rest = tail.get(close + 1..).unwrap_or("");
        }

        names
    }

    /// Substitute the given `(name, value)` pairs into the template.
    ///
    /// Unknown pairs are ignored; placeholders without a pair are left
    /// untouched, which keeps rendering deterministic and total.
    #[must_use]
    pub fn render(&self, values: &[(&str, &str)]) -> String {
        let mut url = String::from(self.template);

        for (name, value) in values {
            url = url.replace(&format!("{{{name}}}"), value);
        }

        url
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Opaque payload returned by a provider: decoded JSON or the raw body.
pub enum Payload {
    /// Generic JSON document, structure left to the caller.
    Json(serde_json::Value),
    /// Verbatim response body for non-JSON sources.
    Raw(String),
}

impl Payload {
    /// Borrow the JSON document, if this payload carries one.
    #[must_use]
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Raw(_) => None,
        }
    }

    /// Borrow the raw body, if this payload carries one.
    #[must_use]
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Payload::Raw(body) => Some(body),
            Payload::Json(_) => None,
        }
    }
}

/// Freshness window for cached payloads, in seconds.
///
/// A zero TTL disables caching entirely, regardless of which cache store a
/// client was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtl(u64);

impl CacheTtl {
    /// Default freshness window used by provider clients.
    pub const DEFAULT: CacheTtl = CacheTtl(600);

    /// TTL that unconditionally bypasses any cache.
    pub const OFF: CacheTtl = CacheTtl(0);

    /// Wrap an explicit number of seconds.
    #[must_use]
    pub const fn from_secs(seconds: u64) -> Self {
        Self(seconds)
    }

    /// Parse a TTL from a raw configuration string.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::Configuration`] when the value is not a
    /// non-negative integer.
    pub fn parse(raw: &str) -> Result<Self, AcquisitionError> {
        raw.trim().parse::<u64>().map(CacheTtl).map_err(|_parse| {
            AcquisitionError::Configuration(format!("Invalid cache TTL '{raw}'"))
        })
    }

    /// Whether this TTL disables caching.
    #[must_use]
    pub const fn is_off(&self) -> bool {
        self.0 == 0
    }

    /// The window in whole seconds.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0
    }
}

impl Default for CacheTtl {
    fn default() -> Self {
        CacheTtl::DEFAULT
    }
}
