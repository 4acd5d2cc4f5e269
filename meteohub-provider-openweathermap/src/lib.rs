//! Provider client for the OpenWeatherMap current-weather API.

use std::sync::Arc;

use async_trait::async_trait;

use meteohub_core::{
    client::Retriever,
    model::{CacheTtl, Payload, ProviderId, ProviderMeta, UrlTemplate},
    plugin::ProviderPlugin,
    ports::{AcquisitionError, CacheStore, Fetcher, ObservationPort},
    transport::{HttpFetcher, TransportConfig},
};

const ENDPOINT: UrlTemplate = UrlTemplate::new(
    "https://api.openweathermap.org/data/2.5/weather?lat={lat}&lon={lon}&appid={key}&units=metric",
);

/// Client for OpenWeatherMap observations at a fixed coordinate.
pub struct OpenWeatherMapClient {
    retriever: Retriever,
    meta: ProviderMeta,
    api_key: String,
    latitude: f64,
    longitude: f64,
}

impl OpenWeatherMapClient {
    /// Create a client bound to one coordinate and API key.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        cache: Option<Arc<dyn CacheStore>>,
        ttl: CacheTtl,
        api_key: String,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            retriever: Retriever::new(fetcher, cache, ttl),
            meta: provider_meta(),
            api_key,
            latitude,
            longitude,
        }
    }

    /// Resolve the current-weather endpoint for this coordinate.
    #[must_use]
    pub fn current_url(&self) -> String {
        let lat = self.latitude.to_string();
        let lon = self.longitude.to_string();

        ENDPOINT.render(&[("lat", &lat), ("lon", &lon), ("key", &self.api_key)])
    }

    /// Fetch the current observation document.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`AcquisitionError`] from the transport or
    /// the JSON decode.
    pub async fn current_data(&self) -> Result<serde_json::Value, AcquisitionError> {
        self.retriever.retrieve_json(&self.current_url()).await
    }
}

#[async_trait]
impl ObservationPort for OpenWeatherMapClient {
    fn provider(&self) -> &ProviderMeta {
        &self.meta
    }

    async fn observations(&self) -> Result<Payload, AcquisitionError> {
        Ok(Payload::Json(self.current_data().await?))
    }
}

/// Build the plugin bundle for the OpenWeatherMap provider.
///
/// # Errors
///
/// Returns [`AcquisitionError::Configuration`] when the default transport
/// cannot be constructed.
pub fn plugin(
    transport: &TransportConfig,
    cache: Option<Arc<dyn CacheStore>>,
    ttl: CacheTtl,
    api_key: String,
    latitude: f64,
    longitude: f64,
) -> Result<ProviderPlugin, AcquisitionError> {
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(transport)?);
    let client = OpenWeatherMapClient::new(fetcher, cache, ttl, api_key, latitude, longitude);

    Ok(ProviderPlugin {
        meta: provider_meta(),
        port: Arc::new(client),
    })
}

fn provider_meta() -> ProviderMeta {
    ProviderMeta {
        id: ProviderId::OpenWeatherMap,
        name: String::from("OpenWeatherMap"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubFetcher;

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, AcquisitionError> {
            Ok(String::from("{\"main\":{\"temp\":11.2}}"))
        }
    }

    fn client() -> OpenWeatherMapClient {
        OpenWeatherMapClient::new(
            Arc::new(StubFetcher),
            None,
            CacheTtl::OFF,
            String::from("OWM_KEY"),
            48.85,
            2.35,
        )
    }

    #[test]
    fn current_url_carries_coordinate_and_key() {
        assert_eq!(
            client().current_url(),
            "https://api.openweathermap.org/data/2.5/weather?lat=48.85&lon=2.35&appid=OWM_KEY&units=metric"
        );
    }

    #[tokio::test]
    async fn current_data_decodes_the_observation() {
        let value = client().current_data().await.expect("stub must decode");

        assert!(value.get("main").is_some());
    }
}
