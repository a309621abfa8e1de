//! Outbound adapters for metrics exporting.
//!
//! Prometheus-backed implementations of domain metrics ports, compiled only
//! with the `metrics` feature.

mod prometheus_weather_lookups;

pub use prometheus_weather_lookups::PrometheusWeatherLookupMetrics;
