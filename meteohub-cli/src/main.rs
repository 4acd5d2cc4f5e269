//! Command-line probe that queries one configured provider and prints its
//! raw payload.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use meteohub_core::{
    cache::MemoryCache,
    config::{Config, ProviderSettings},
    model::{CacheTtl, Payload, ProviderId},
    plugin::{ProviderPlugin, ProviderRegistry},
    ports::CacheStore,
    service::StationService,
    transport::TransportConfig,
};
use meteohub_provider_ambient as ambient;
use meteohub_provider_bloomsky as bloomsky;
use meteohub_provider_file as file;
use meteohub_provider_netatmo as netatmo;
use meteohub_provider_openweathermap as openweathermap;
use meteohub_provider_pioupiou as pioupiou;
use meteohub_provider_weatherflow as weatherflow;
use meteohub_provider_weatherlink as weatherlink;

#[derive(Debug, Parser)]
#[command(
    name = "meteohub",
    about = "Query a configured weather provider and print its raw payload."
)]
struct Cli {
    /// Provider slug to query, e.g. netatmo, pioupiou, file.
    provider: String,

    /// Path to the TOML configuration file.
    #[arg(long, default_value = "meteohub.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("Could not load configuration from {}", cli.config.display()))?;
    let provider = ProviderId::try_from(cli.provider.as_str())?;

    let transport = config.transport_config();
    let ttl = config.ttl()?;
    let cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new());

    // Wire up every provider with a configuration table; querying one that
    // is absent fails with a registry error naming it.
    let mut plugins = Vec::new();
    for id in ProviderId::all() {
        if let Some(settings) = config.provider(*id) {
            let plugin =
                plugin_from_settings(*id, settings, &transport, Some(Arc::clone(&cache)), ttl)?;
            plugins.push(plugin);
        }
    }

    let registry = Arc::new(ProviderRegistry::new(plugins));
    let service = StationService::new(registry);

    let payload = service.observations(provider).await?;

    match payload {
        Payload::Json(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Payload::Raw(body) => println!("{body}"),
    }

    Ok(())
}

fn plugin_from_settings(
    id: ProviderId,
    settings: &ProviderSettings,
    transport: &TransportConfig,
    cache: Option<Arc<dyn CacheStore>>,
    ttl: CacheTtl,
) -> Result<ProviderPlugin> {
    let plugin = match id {
        ProviderId::Ambient => ambient::plugin(
            transport,
            cache,
            ttl,
            required(settings.api_key.clone(), id, "api_key")?,
        )?,
        ProviderId::BloomSky => bloomsky::plugin(
            transport,
            cache,
            ttl,
            &required(settings.api_key.clone(), id, "api_key")?,
        )?,
        ProviderId::Netatmo => netatmo::plugin(
            transport,
            cache,
            ttl,
            required(settings.token.clone(), id, "token")?,
        )?,
        ProviderId::OpenWeatherMap => openweathermap::plugin(
            transport,
            cache,
            ttl,
            required(settings.api_key.clone(), id, "api_key")?,
            required(settings.latitude, id, "latitude")?,
            required(settings.longitude, id, "longitude")?,
        )?,
        ProviderId::Pioupiou => pioupiou::plugin(
            transport,
            cache,
            ttl,
            required(settings.station.clone(), id, "station")?,
        )?,
        ProviderId::WeatherFlow => weatherflow::plugin(
            transport,
            cache,
            ttl,
            required(settings.api_key.clone(), id, "api_key")?,
            required(settings.station.clone(), id, "station")?,
        )?,
        ProviderId::WeatherLink => weatherlink::plugin(
            transport,
            cache,
            ttl,
            &required(settings.api_key.clone(), id, "api_key")?,
        )?,
        ProviderId::File => file::plugin(
            transport,
            cache,
            ttl,
            required(settings.connection, id, "connection")?,
            required(settings.resource.clone(), id, "resource")?,
        )?,
    };

    Ok(plugin)
}

fn required<T>(value: Option<T>, id: ProviderId, field: &str) -> Result<T> {
    value.with_context(|| format!("Provider '{id}' is missing required setting '{field}'"))
}
