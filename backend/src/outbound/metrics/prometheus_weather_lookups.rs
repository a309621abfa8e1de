//! Prometheus adapter for weather lookup metrics.
//!
//! Counters are registered with a provided registry and exposed through the
//! `/metrics` endpoint alongside the HTTP middleware metrics.

use async_trait::async_trait;
use prometheus::{CounterVec, Opts, Registry};

use crate::domain::ports::{LookupOrigin, WeatherLookupMetrics, WeatherLookupMetricsError};

/// Prometheus-backed lookup metrics recorder.
///
/// # Metrics
///
/// - `weather_lookups_total` (counter), label `origin`: `cached`,
///   `refreshed`, or `placeholder`
/// - `weather_provider_failures_total` (counter), label `kind`: `transport`,
///   `timeout`, `rate_limited`, `rejected`, or `decode`
pub struct PrometheusWeatherLookupMetrics {
    lookups_total: CounterVec,
    provider_failures_total: CounterVec,
}

impl PrometheusWeatherLookupMetrics {
    /// Create and register metrics with the given registry.
    ///
    /// # Errors
    ///
    /// Returns an error if either counter cannot be registered, for example
    /// when a metric with the same name already exists in the registry.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let lookups_total = CounterVec::new(
            Opts::new(
                "weather_lookups_total",
                "Completed weather lookups by how they were served",
            ),
            &["origin"],
        )?;
        let provider_failures_total = CounterVec::new(
            Opts::new(
                "weather_provider_failures_total",
                "Failed weather provider calls by error kind",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(lookups_total.clone()))?;
        registry.register(Box::new(provider_failures_total.clone()))?;
        Ok(Self {
            lookups_total,
            provider_failures_total,
        })
    }
}

#[async_trait]
impl WeatherLookupMetrics for PrometheusWeatherLookupMetrics {
    async fn record_lookup(&self, origin: LookupOrigin) -> Result<(), WeatherLookupMetricsError> {
        self.lookups_total
            .with_label_values(&[origin.as_str()])
            .inc();
        Ok(())
    }

    async fn record_provider_failure(&self, kind: &str) -> Result<(), WeatherLookupMetricsError> {
        self.provider_failures_total
            .with_label_values(&[kind])
            .inc();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn metrics() -> (Registry, PrometheusWeatherLookupMetrics) {
        let registry = Registry::new();
        let metrics = PrometheusWeatherLookupMetrics::new(&registry)
            .expect("metric registration should succeed");
        (registry, metrics)
    }

    #[tokio::test]
    async fn registers_both_counters() {
        let (registry, metrics) = metrics();
        metrics
            .record_lookup(LookupOrigin::Cached)
            .await
            .expect("recording should succeed");
        metrics
            .record_provider_failure("timeout")
            .await
            .expect("recording should succeed");

        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.name().to_owned())
            .collect();
        assert!(names.contains(&"weather_lookups_total".to_owned()));
        assert!(names.contains(&"weather_provider_failures_total".to_owned()));
    }

    #[rstest]
    #[case(LookupOrigin::Cached, "cached")]
    #[case(LookupOrigin::Refreshed, "refreshed")]
    #[case(LookupOrigin::Placeholder, "placeholder")]
    #[tokio::test]
    async fn lookups_are_labelled_by_origin(#[case] origin: LookupOrigin, #[case] label: &str) {
        let (_registry, metrics) = metrics();
        metrics.record_lookup(origin).await.expect("recorded");
        metrics.record_lookup(origin).await.expect("recorded");

        let counter = metrics.lookups_total.with_label_values(&[label]);
        assert_eq!(counter.get() as u64, 2);
    }

    #[tokio::test]
    async fn provider_failures_are_labelled_by_kind() {
        let (_registry, metrics) = metrics();
        metrics
            .record_provider_failure("rate_limited")
            .await
            .expect("recorded");

        let counter = metrics
            .provider_failures_total
            .with_label_values(&["rate_limited"]);
        assert_eq!(counter.get() as u64, 1);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let registry = Registry::new();
        PrometheusWeatherLookupMetrics::new(&registry).expect("first registration");
        assert!(PrometheusWeatherLookupMetrics::new(&registry).is_err());
    }
}
