//! Provider client for the BloomSky device API.

use std::sync::Arc;

use async_trait::async_trait;

use meteohub_core::{
    client::Retriever,
    model::{CacheTtl, Payload, ProviderId, ProviderMeta, UrlTemplate},
    plugin::ProviderPlugin,
    ports::{AcquisitionError, CacheStore, Fetcher, ObservationPort},
    transport::{HeaderFetcher, TransportConfig},
};

// The endpoint itself is fixed; the credential travels in an Authorization
// header, so the default transport is the header-capable fetcher.
const ENDPOINT: UrlTemplate = UrlTemplate::new("https://api.bloomsky.com/api/skydata/?unit=intl");

/// Client for the BloomSky `skydata` listing.
pub struct BloomSkyClient {
    retriever: Retriever,
    meta: ProviderMeta,
}

impl BloomSkyClient {
    /// Create a client on a transport that already carries the credential.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        cache: Option<Arc<dyn CacheStore>>,
        ttl: CacheTtl,
    ) -> Self {
        Self {
            retriever: Retriever::new(fetcher, cache, ttl),
            meta: provider_meta(),
        }
    }

    /// Resolve the skydata endpoint.
    #[must_use]
    pub fn skydata_url(&self) -> String {
        ENDPOINT.render(&[])
    }

    /// Fetch the device list with current observations.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`AcquisitionError`] from the transport or
    /// the JSON decode.
    pub async fn device_data(&self) -> Result<serde_json::Value, AcquisitionError> {
        self.retriever.retrieve_json(&self.skydata_url()).await
    }
}

#[async_trait]
impl ObservationPort for BloomSkyClient {
    fn provider(&self) -> &ProviderMeta {
        &self.meta
    }

    async fn observations(&self) -> Result<Payload, AcquisitionError> {
        Ok(Payload::Json(self.device_data().await?))
    }
}

/// Build the plugin bundle for the BloomSky provider.
///
/// The API key is installed as the transport's `Authorization` header.
///
/// # Errors
///
/// Returns [`AcquisitionError::Configuration`] when the header map or the
/// default transport cannot be constructed.
pub fn plugin(
    transport: &TransportConfig,
    cache: Option<Arc<dyn CacheStore>>,
    ttl: CacheTtl,
    api_key: &str,
) -> Result<ProviderPlugin, AcquisitionError> {
    let headers = vec![(String::from("Authorization"), String::from(api_key))];
    let fetcher: Arc<dyn Fetcher> = Arc::new(HeaderFetcher::new(transport, &headers)?);
    let client = BloomSkyClient::new(fetcher, cache, ttl);

    Ok(ProviderPlugin {
        meta: provider_meta(),
        port: Arc::new(client),
    })
}

fn provider_meta() -> ProviderMeta {
    ProviderMeta {
        id: ProviderId::BloomSky,
        name: String::from("BloomSky"),
    }
}
