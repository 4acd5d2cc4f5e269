//! Provider client for the Netatmo station API.
//!
//! Netatmo wraps its failures in a structured envelope, so this client
//! carries the most elaborate error classification of the providers: a
//! decodable `{"error":{"code":..,"message":..}}` body supersedes the
//! HTTP-level status and message.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use meteohub_core::{
    client::Retriever,
    model::{CacheTtl, Payload, ProviderId, ProviderMeta, UrlTemplate},
    plugin::ProviderPlugin,
    ports::{AcquisitionError, CacheStore, Fetcher, ObservationPort},
    transport::{HttpFetcher, TransportConfig},
};

const ENDPOINT: UrlTemplate =
    UrlTemplate::new("https://api.netatmo.com/api/getstationsdata?access_token={token}");

/// Error envelope Netatmo embeds in failure bodies.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: i64,
    message: String,
}

/// Replace a transport failure by the provider's own diagnostic when the
/// body decodes as a Netatmo error envelope. All other errors pass through
/// untouched.
fn classify(error: AcquisitionError) -> AcquisitionError {
    match error {
        AcquisitionError::Transport { status, message } => {
            match serde_json::from_str::<ErrorEnvelope>(&message) {
                Ok(envelope) => AcquisitionError::ProviderApi {
                    code: envelope.error.code,
                    message: envelope.error.message,
                    raw_body: message,
                },
                Err(_not_an_envelope) => AcquisitionError::Transport { status, message },
            }
        }
        other => other,
    }
}

/// Client for the Netatmo `getstationsdata` endpoint.
pub struct NetatmoClient {
    retriever: Retriever,
    meta: ProviderMeta,
    access_token: String,
}

impl NetatmoClient {
    /// Create a client bound to one access token.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        cache: Option<Arc<dyn CacheStore>>,
        ttl: CacheTtl,
        access_token: String,
    ) -> Self {
        Self {
            retriever: Retriever::new(fetcher, cache, ttl),
            meta: provider_meta(),
            access_token,
        }
    }

    /// Resolve the stations endpoint with the token in place.
    #[must_use]
    pub fn stations_url(&self) -> String {
        ENDPOINT.render(&[("token", &self.access_token)])
    }

    /// Fetch the station listing with current observations.
    ///
    /// A 2xx body that nevertheless decodes as an error envelope is also
    /// surfaced as [`AcquisitionError::ProviderApi`].
    ///
    /// # Errors
    ///
    /// Propagates the classified [`AcquisitionError`], with transport
    /// failures upgraded to provider diagnostics where the body allows.
    pub async fn station_data(&self) -> Result<serde_json::Value, AcquisitionError> {
        let body = self
            .retriever
            .retrieve(&self.stations_url())
            .await
            .map_err(classify)?;

        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
            return Err(AcquisitionError::ProviderApi {
                code: envelope.error.code,
                message: envelope.error.message,
                raw_body: body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ObservationPort for NetatmoClient {
    fn provider(&self) -> &ProviderMeta {
        &self.meta
    }

    async fn observations(&self) -> Result<Payload, AcquisitionError> {
        Ok(Payload::Json(self.station_data().await?))
    }
}

/// Build the plugin bundle for the Netatmo provider.
///
/// # Errors
///
/// Returns [`AcquisitionError::Configuration`] when the default transport
/// cannot be constructed.
pub fn plugin(
    transport: &TransportConfig,
    cache: Option<Arc<dyn CacheStore>>,
    ttl: CacheTtl,
    access_token: String,
) -> Result<ProviderPlugin, AcquisitionError> {
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(transport)?);
    let client = NetatmoClient::new(fetcher, cache, ttl, access_token);

    Ok(ProviderPlugin {
        meta: provider_meta(),
        port: Arc::new(client),
    })
}

fn provider_meta() -> ProviderMeta {
    ProviderMeta {
        id: ProviderId::Netatmo,
        name: String::from("Netatmo"),
    }
}
