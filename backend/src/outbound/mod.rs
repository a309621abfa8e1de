//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed weather store using Diesel
//! - **memory**: process-local weather store for running without a database
//! - **openweather**: HTTP client for the OpenWeather current-weather API
//! - **metrics**: Prometheus-backed metrics exporters (feature-gated)
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no cache policy.

pub mod memory;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod openweather;
pub mod persistence;
