//! Provider client for the WeatherFlow Smart Weather REST API.

use std::sync::Arc;

use async_trait::async_trait;

use meteohub_core::{
    client::Retriever,
    model::{CacheTtl, Payload, ProviderId, ProviderMeta, UrlTemplate},
    plugin::ProviderPlugin,
    ports::{AcquisitionError, CacheStore, Fetcher, ObservationPort},
    transport::{HttpFetcher, TransportConfig},
};

// Same REST surface, two credential placements: `api_key` for public
// stations, `token` for stations owned by the key holder.
const PUBLIC_ENDPOINT: UrlTemplate =
    UrlTemplate::new("https://swd.weatherflow.com/swd/rest/{command}/{params}?api_key={key}");
const PRIVATE_ENDPOINT: UrlTemplate =
    UrlTemplate::new("https://swd.weatherflow.com/swd/rest/{command}/{params}?token={key}");

const OBSERVATIONS_COMMAND: &str = "observations/station";

/// Client for the WeatherFlow `swd/rest` command endpoints.
pub struct WeatherFlowClient {
    retriever: Retriever,
    meta: ProviderMeta,
    key: String,
    station_id: String,
}

impl WeatherFlowClient {
    /// Create a client bound to one credential and one station.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        cache: Option<Arc<dyn CacheStore>>,
        ttl: CacheTtl,
        key: String,
        station_id: String,
    ) -> Self {
        Self {
            retriever: Retriever::new(fetcher, cache, ttl),
            meta: provider_meta(),
            key,
            station_id,
        }
    }

    /// Resolve a command endpoint with the credential as `api_key`.
    #[must_use]
    pub fn public_url(&self, command: &str, params: &str) -> String {
        PUBLIC_ENDPOINT.render(&[("command", command), ("params", params), ("key", &self.key)])
    }

    /// Resolve a command endpoint with the credential as `token`.
    #[must_use]
    pub fn private_url(&self, command: &str, params: &str) -> String {
        PRIVATE_ENDPOINT.render(&[("command", command), ("params", params), ("key", &self.key)])
    }

    /// Fetch a public-station command payload.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`AcquisitionError`] from the transport or
    /// the JSON decode.
    pub async fn raw_public_data(
        &self,
        command: &str,
        params: &str,
    ) -> Result<serde_json::Value, AcquisitionError> {
        self.retriever
            .retrieve_json(&self.public_url(command, params))
            .await
    }

    /// Fetch a private-station command payload.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`AcquisitionError`] from the transport or
    /// the JSON decode.
    pub async fn raw_private_data(
        &self,
        command: &str,
        params: &str,
    ) -> Result<serde_json::Value, AcquisitionError> {
        self.retriever
            .retrieve_json(&self.private_url(command, params))
            .await
    }
}

#[async_trait]
impl ObservationPort for WeatherFlowClient {
    fn provider(&self) -> &ProviderMeta {
        &self.meta
    }

    async fn observations(&self) -> Result<Payload, AcquisitionError> {
        Ok(Payload::Json(
            self.raw_private_data(OBSERVATIONS_COMMAND, &self.station_id)
                .await?,
        ))
    }
}

/// Build the plugin bundle for the WeatherFlow provider.
///
/// # Errors
///
/// Returns [`AcquisitionError::Configuration`] when the default transport
/// cannot be constructed.
pub fn plugin(
    transport: &TransportConfig,
    cache: Option<Arc<dyn CacheStore>>,
    ttl: CacheTtl,
    key: String,
    station_id: String,
) -> Result<ProviderPlugin, AcquisitionError> {
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(transport)?);
    let client = WeatherFlowClient::new(fetcher, cache, ttl, key, station_id);

    Ok(ProviderPlugin {
        meta: provider_meta(),
        port: Arc::new(client),
    })
}

fn provider_meta() -> ProviderMeta {
    ProviderMeta {
        id: ProviderId::WeatherFlow,
        name: String::from("WeatherFlow"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubFetcher;

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, AcquisitionError> {
            Ok(String::from("{\"status\":{\"status_code\":0}}"))
        }
    }

    fn client() -> WeatherFlowClient {
        WeatherFlowClient::new(
            Arc::new(StubFetcher),
            None,
            CacheTtl::OFF,
            String::from("KEY"),
            String::from("2481"),
        )
    }

    #[test]
    fn public_entry_point_places_the_credential_as_api_key() {
        let url = client().public_url("observations/station", "2481");

        assert_eq!(
            url,
            "https://swd.weatherflow.com/swd/rest/observations/station/2481?api_key=KEY"
        );
    }

    #[test]
    fn private_entry_point_places_the_credential_as_token() {
        let url = client().private_url("observations/station", "2481");

        assert_eq!(
            url,
            "https://swd.weatherflow.com/swd/rest/observations/station/2481?token=KEY"
        );
    }

    #[tokio::test]
    async fn observations_go_through_the_private_placement() {
        let payload = client().observations().await.expect("stub must decode");

        assert!(payload.as_json().is_some());
    }
}
