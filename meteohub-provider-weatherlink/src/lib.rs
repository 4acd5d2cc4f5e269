//! Provider client for the Davis WeatherLink v1 API.

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
    "https://api.weatherlink.com/v1/{command}.json?user={service_did}&pass={service_ownerpass}&apiToken={service_apitoken}",
);

/// Command serving the current observation snapshot.
const CURRENT_COMMAND: &str = "NoaaExt";

/// Separator joining device id, API token, and owner password into the one
/// credential string stored in configuration.
const COMPOSITE_SEPARATOR: char = '|';

/// Placeholder substituted for every field of a malformed composite.
const MALFORMED_FIELD: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
struct ServiceCredentials {
    device_id: String,
    api_token: String,
    owner_password: String,
}

// Historical behavior carried over from earlier installations: a composite
// that does not split into exactly three fields degrades every field to the
// placeholder instead of failing. Do not imitate this elsewhere.
fn split_composite(composite: &str) -> ServiceCredentials {
    let parts: Vec<&str> = composite.split(COMPOSITE_SEPARATOR).collect();

    match parts.as_slice() {
        [device_id, api_token, owner_password] => ServiceCredentials {
            device_id: String::from(*device_id),
            api_token: String::from(*api_token),
            owner_password: String::from(*owner_password),
        },
        _ => ServiceCredentials {
            device_id: String::from(MALFORMED_FIELD),
            api_token: String::from(MALFORMED_FIELD),
            owner_password: String::from(MALFORMED_FIELD),
        },
    }
}

/// Client for the WeatherLink v1 command endpoints.
pub struct WeatherLinkClient {
    retriever: Retriever,
    meta: ProviderMeta,
    credentials: ServiceCredentials,
}

impl WeatherLinkClient {
    /// Create a client from the stored composite credential.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        cache: Option<Arc<dyn CacheStore>>,
        ttl: CacheTtl,
        composite: &str,
    ) -> Self {
        Self {
            retriever: Retriever::new(fetcher, cache, ttl),
            meta: provider_meta(),
            credentials: split_composite(composite),
        }
    }

    /// Resolve a command endpoint with all three credential fields in place.
    #[must_use]
    pub fn command_url(&self, command: &str) -> String {
        ENDPOINT.render(&[
            ("command", command),
            ("service_did", &self.credentials.device_id),
            ("service_ownerpass", &self.credentials.owner_password),
            ("service_apitoken", &self.credentials.api_token),
        ])
    }

    /// Fetch one command's payload as a generic JSON document.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`AcquisitionError`] from the transport or
    /// the JSON decode.
    pub async fn raw_command_data(
        &self,
        command: &str,
    ) -> Result<serde_json::Value, AcquisitionError> {
        self.retriever.retrieve_json(&self.command_url(command)).await
    }
}

#[async_trait]
impl ObservationPort for WeatherLinkClient {
    fn provider(&self) -> &ProviderMeta {
        &self.meta
    }

    async fn observations(&self) -> Result<Payload, AcquisitionError> {
        Ok(Payload::Json(self.raw_command_data(CURRENT_COMMAND).await?))
    }
}

/// Build the plugin bundle for the WeatherLink provider.
///
/// # Errors
///
/// Returns [`AcquisitionError::Configuration`] when the default transport
/// cannot be constructed.
pub fn plugin(
    transport: &TransportConfig,
    cache: Option<Arc<dyn CacheStore>>,
    ttl: CacheTtl,
    composite: &str,
) -> Result<ProviderPlugin, AcquisitionError> {
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(transport)?);
    let client = WeatherLinkClient::new(fetcher, cache, ttl, composite);

    Ok(ProviderPlugin {
        meta: provider_meta(),
        port: Arc::new(client),
    })
}

fn provider_meta() -> ProviderMeta {
    ProviderMeta {
        id: ProviderId::WeatherLink,
        name: String::from("WeatherLink"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubFetcher;

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, AcquisitionError> {
            Ok(String::from("{}"))
        }
    }

    fn client(composite: &str) -> WeatherLinkClient {
        WeatherLinkClient::new(Arc::new(StubFetcher), None, CacheTtl::OFF, composite)
    }

    #[test]
    fn composite_fields_land_in_their_query_parameters() {
        let url = client("D1|TOK2|PASS3").command_url(CURRENT_COMMAND);

        assert!(url.contains("user=D1&pass=PASS3&apiToken=TOK2"));
        assert!(url.starts_with("https://api.weatherlink.com/v1/NoaaExt.json?"));
    }

    #[test]
    fn two_part_composite_degrades_to_placeholders() {
        let url = client("D1|TOK2").command_url(CURRENT_COMMAND);

        assert!(url.contains("user=-&pass=-&apiToken=-"));
    }

    #[test]
    fn four_part_composite_degrades_to_placeholders() {
        let url = client("D1|TOK2|PASS3|EXTRA").command_url(CURRENT_COMMAND);

        assert!(url.contains("user=-&pass=-&apiToken=-"));
    }

    #[test]
    fn command_url_is_deterministic() {
        let first = client("D1|TOK2|PASS3").command_url("StationStatus");
        let second = client("D1|TOK2|PASS3").command_url("StationStatus");

        assert_eq!(first, second);
    }
}
