//! Provider client for the Pioupiou wind sensor API.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use meteohub_core::{
    client::Retriever,
    model::{CacheTtl, Payload, ProviderId, ProviderMeta, UrlTemplate},
    plugin::ProviderPlugin,
    ports::{AcquisitionError, CacheStore, Fetcher, ObservationPort},
    transport::{HttpFetcher, TransportConfig},
};

// Live and archive share the client and the cache routine; only the
// endpoint differs.
const LIVE_ENDPOINT: UrlTemplate =
    UrlTemplate::new("https://api.pioupiou.fr/v1/live/{sensor_id}");
const ARCHIVE_ENDPOINT: UrlTemplate =
    UrlTemplate::new("https://api.pioupiou.fr/v1/archive/{sensor_id}?start={start}&stop={stop}");

const BOUND_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Client for one Pioupiou sensor.
pub struct PioupiouClient {
    retriever: Retriever,
    meta: ProviderMeta,
    sensor_id: String,
}

impl PioupiouClient {
    /// Create a client bound to one sensor.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        cache: Option<Arc<dyn CacheStore>>,
        ttl: CacheTtl,
        sensor_id: String,
    ) -> Self {
        Self {
            retriever: Retriever::new(fetcher, cache, ttl),
            meta: provider_meta(),
            sensor_id,
        }
    }

    /// Resolve the live endpoint for this sensor.
    #[must_use]
    pub fn live_url(&self) -> String {
        LIVE_ENDPOINT.render(&[("sensor_id", &self.sensor_id)])
    }

    /// Resolve the archive endpoint for this sensor between two UTC bounds.
    #[must_use]
    pub fn archive_url(&self, start: DateTime<Utc>, stop: DateTime<Utc>) -> String {
        let start_bound = start.format(BOUND_FORMAT).to_string();
        let stop_bound = stop.format(BOUND_FORMAT).to_string();

        ARCHIVE_ENDPOINT.render(&[
            ("sensor_id", &self.sensor_id),
            ("start", &start_bound),
            ("stop", &stop_bound),
        ])
    }

    /// Fetch the sensor's latest measurement.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`AcquisitionError`] from the transport or
    /// the JSON decode.
    pub async fn live_data(&self) -> Result<serde_json::Value, AcquisitionError> {
        self.retriever.retrieve_json(&self.live_url()).await
    }

    /// Fetch archived measurements between two UTC bounds.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`AcquisitionError`] from the transport or
    /// the JSON decode.
    pub async fn archive_data(
        &self,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
    ) -> Result<serde_json::Value, AcquisitionError> {
        self.retriever
            .retrieve_json(&self.archive_url(start, stop))
            .await
    }
}

#[async_trait]
impl ObservationPort for PioupiouClient {
    fn provider(&self) -> &ProviderMeta {
        &self.meta
    }

    async fn observations(&self) -> Result<Payload, AcquisitionError> {
        Ok(Payload::Json(self.live_data().await?))
    }
}

/// Build the plugin bundle for the Pioupiou provider.
///
/// # Errors
///
/// Returns [`AcquisitionError::Configuration`] when the default transport
/// cannot be constructed.
pub fn plugin(
    transport: &TransportConfig,
    cache: Option<Arc<dyn CacheStore>>,
    ttl: CacheTtl,
    sensor_id: String,
) -> Result<ProviderPlugin, AcquisitionError> {
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(transport)?);
    let client = PioupiouClient::new(fetcher, cache, ttl, sensor_id);

    Ok(ProviderPlugin {
        meta: provider_meta(),
        port: Arc::new(client),
    })
}

fn provider_meta() -> ProviderMeta {
    ProviderMeta {
        id: ProviderId::Pioupiou,
        name: String::from("Pioupiou"),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    struct StubFetcher;

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, AcquisitionError> {
            Ok(String::from("{\"data\":{\"measurements\":{\"wind_speed_avg\":14.5}}}"))
        }
    }

    fn client() -> PioupiouClient {
        PioupiouClient::new(
            Arc::new(StubFetcher),
            None,
            CacheTtl::OFF,
            String::from("563"),
        )
    }

    #[test]
    fn live_url_substitutes_the_sensor() {
        assert_eq!(client().live_url(), "https://api.pioupiou.fr/v1/live/563");
    }

    #[test]
    fn archive_url_carries_utc_bounds() {
        let start = Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).single().expect("valid start");
        let stop = Utc.with_ymd_and_hms(2023, 3, 2, 0, 0, 0).single().expect("valid stop");

        assert_eq!(
            client().archive_url(start, stop),
            "https://api.pioupiou.fr/v1/archive/563?start=2023-03-01T00:00:00Z&stop=2023-03-02T00:00:00Z"
        );
    }

    #[tokio::test]
    async fn live_data_decodes_the_measurement_document() {
        let value = client().live_data().await.expect("stub must decode");

        assert!(value.get("data").is_some());
    }
}
