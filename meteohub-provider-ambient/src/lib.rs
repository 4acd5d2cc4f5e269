//! Provider client for the Ambient Weather network API.

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
    "https://api.ambientweather.net/v1/devices?applicationKey={application}&apiKey={key}",
);

// Single application key shared by every installation; combined with the
// per-installation API key on each request.
const APPLICATION_KEY: &str = "d9c7f3a15e824b6c8b7e2f4a0c1d5e3b9a8f6074c2e1d0b3a5f7c9e8d6b4a2f1";

/// Client for the Ambient Weather `/v1/devices` listing.
pub struct AmbientClient {
    retriever: Retriever,
    meta: ProviderMeta,
    api_key: String,
}

impl AmbientClient {
    /// Create a client bound to the given transport, cache, and API key.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        cache: Option<Arc<dyn CacheStore>>,
        ttl: CacheTtl,
        api_key: String,
    ) -> Self {
        Self {
            retriever: Retriever::new(fetcher, cache, ttl),
            meta: provider_meta(),
            api_key,
        }
    }

    /// Resolve the devices endpoint with both keys in place.
    #[must_use]
    pub fn devices_url(&self) -> String {
        ENDPOINT.render(&[("application", APPLICATION_KEY), ("key", &self.api_key)])
    }

    /// Fetch the device list with current observations for this key.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`AcquisitionError`] from the transport or
    /// the JSON decode.
    pub async fn station_data(&self) -> Result<serde_json::Value, AcquisitionError> {
        self.retriever.retrieve_json(&self.devices_url()).await
    }
}

#[async_trait]
impl ObservationPort for AmbientClient {
    fn provider(&self) -> &ProviderMeta {
        &self.meta
    }

    async fn observations(&self) -> Result<Payload, AcquisitionError> {
        Ok(Payload::Json(self.station_data().await?))
    }
}

/// Build the plugin bundle for the Ambient provider.
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
) -> Result<ProviderPlugin, AcquisitionError> {
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(transport)?);
    let client = AmbientClient::new(fetcher, cache, ttl, api_key);

    Ok(ProviderPlugin {
        meta: provider_meta(),
        port: Arc::new(client),
    })
}

fn provider_meta() -> ProviderMeta {
    ProviderMeta {
        id: ProviderId::Ambient,
        name: String::from("Ambient Weather"),
    }
}
