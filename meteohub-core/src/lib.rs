//! Core types and service wiring for the meteohub weather observation aggregator.

/// Bundled in-memory cache store.
pub mod cache;
/// Shared cache-or-fetch routine provider clients are built on.
pub mod client;
/// Host-supplied configuration surface.
pub mod config;
/// Domain models and identifiers shared by all providers.
pub mod model;
/// Registry and helpers for plugging provider clients into the service.
pub mod plugin;
/// Traits describing the acquisition interfaces and the error taxonomy.
pub mod ports;
/// High-level service facade used by clients.
pub mod service;
/// HTTP implementations of the transport port.
pub mod transport;

pub use cache::*;
pub use client::*;
pub use config::*;
pub use model::*;
pub use plugin::*;
pub use ports::*;
pub use service::*;
pub use transport::*;
