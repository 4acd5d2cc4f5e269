//! Registry for all provider plugins and their ports.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{ProviderId, ProviderMeta};
use crate::ports::{AcquisitionError, ObservationPort};

/// A provider bundled with the port implementing its acquisition.
pub struct ProviderPlugin {
    /// Static metadata describing the provider.
    pub meta: ProviderMeta,
    /// Implementation fetching the provider's current observations.
    pub port: Arc<dyn ObservationPort>,
}

impl std::fmt::Debug for ProviderPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderPlugin")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// Registry that resolves plugins by provider identifier.
pub struct ProviderRegistry {
    plugins: HashMap<ProviderId, ProviderPlugin>,
}

impl ProviderRegistry {
    /// Build a registry from the provided plugin list.
    #[must_use]
    pub fn new(plugins: Vec<ProviderPlugin>) -> Self {
        let plugins_map = plugins
            .into_iter()
            .map(|plugin| (plugin.meta.id, plugin))
            .collect();
        Self {
            plugins: plugins_map,
        }
    }

    /// Return metadata for all registered providers.
    #[must_use]
    pub fn providers(&self) -> Vec<ProviderMeta> {
        self.plugins
            .values()
            .map(|plugin| plugin.meta.clone())
            .collect()
    }

    /// Iterator over provider metadata.
    pub fn providers_iter(&self) -> impl Iterator<Item = &ProviderMeta> {
        self.plugins.values().map(|plugin| &plugin.meta)
    }

    /// Look up a plugin for the given provider.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::Configuration`] when no plugin is
    /// registered under `provider`; a missing source is a wiring mistake
    /// caught before any network access.
    pub fn plugin(&self, provider: ProviderId) -> Result<&ProviderPlugin, AcquisitionError> {
        self.plugins.get(&provider).ok_or_else(|| {
            AcquisitionError::Configuration(format!("No plugin registered for '{provider}'"))
        })
    }
}
