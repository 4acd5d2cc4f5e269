//! High-level service facade combining all providers.

use std::sync::Arc;

use crate::model::{Payload, ProviderId, ProviderMeta};
use crate::plugin::ProviderRegistry;
use crate::ports::AcquisitionError;

/// Public entry point for acquiring raw provider payloads.
pub struct StationService {
    registry: Arc<ProviderRegistry>,
}

impl StationService {
    /// Create a new service bound to the provided registry.
    #[must_use]
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// List all registered providers and their display names.
    #[must_use]
    pub fn providers(&self) -> Vec<ProviderMeta> {
        self.registry.providers()
    }

    /// Fetch current observations from one provider.
    ///
    /// Classified failures are logged at their policy severity and then
    /// propagated unchanged; this layer never retries and never substitutes
    /// a default payload.
    ///
    /// # Errors
    ///
    /// Returns an [`AcquisitionError`] when the provider is not registered
    /// or its acquisition fails.
    pub async fn observations(&self, provider: ProviderId) -> Result<Payload, AcquisitionError> {
        let plugin = self.registry.plugin(provider)?;

        match plugin.port.observations().await {
            Ok(payload) => Ok(payload),
            Err(error) => {
                error.report(provider);
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct StaticPort {
        meta: ProviderMeta,
    }

    #[async_trait]
    impl crate::ports::ObservationPort for StaticPort {
        fn provider(&self) -> &ProviderMeta {
            &self.meta
        }

        async fn observations(&self) -> Result<Payload, AcquisitionError> {
            Ok(Payload::Raw(String::from("12.5,1013")))
        }
    }

    fn meta() -> ProviderMeta {
        ProviderMeta {
            id: ProviderId::File,
            name: String::from("Station file"),
        }
    }

    #[tokio::test]
    async fn registered_provider_payloads_pass_through() {
        let plugin = crate::plugin::ProviderPlugin {
            meta: meta(),
            port: Arc::new(StaticPort { meta: meta() }),
        };
        let service = StationService::new(Arc::new(ProviderRegistry::new(vec![plugin])));

        let payload = service
            .observations(ProviderId::File)
            .await
            .expect("registered provider must resolve");

        assert_eq!(payload.as_raw(), Some("12.5,1013"));
    }

    #[tokio::test]
    async fn missing_provider_is_a_configuration_error() {
        let service = StationService::new(Arc::new(ProviderRegistry::new(Vec::new())));

        let err = service.observations(ProviderId::Netatmo).await.unwrap_err();
        assert!(matches!(err, AcquisitionError::Configuration(_)));
    }
}
