//! Domain port surface for recording lookup outcome metrics.
//!
//! Keeps the refresh service independent of any particular metrics backend.
//! Production wires a Prometheus exporter when the `metrics` feature is on;
//! everything else uses the no-op implementation.

use async_trait::async_trait;

use super::{LookupOrigin, define_port_error};

define_port_error! {
    /// Errors exposed when recording lookup metrics.
    pub enum WeatherLookupMetricsError {
        /// Metric exporter rejected the write.
        Export { message: String } => "weather lookup metrics exporter failed: {message}",
    }
}

/// Metrics recording port for lookup outcomes.
#[async_trait]
pub trait WeatherLookupMetrics: Send + Sync {
    /// Record one completed lookup and how it was served.
    async fn record_lookup(&self, origin: LookupOrigin) -> Result<(), WeatherLookupMetricsError>;

    /// Record a failed provider call, labelled by error kind.
    async fn record_provider_failure(&self, kind: &str) -> Result<(), WeatherLookupMetricsError>;
}

/// No-op implementation for when metrics are disabled or in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpWeatherLookupMetrics;

#[async_trait]
impl WeatherLookupMetrics for NoOpWeatherLookupMetrics {
    async fn record_lookup(&self, _origin: LookupOrigin) -> Result<(), WeatherLookupMetricsError> {
        Ok(())
    }

    async fn record_provider_failure(&self, _kind: &str) -> Result<(), WeatherLookupMetricsError> {
        Ok(())
    }
}
