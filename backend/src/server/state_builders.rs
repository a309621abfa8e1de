//! Builders wiring the weather refresh service behind the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::info;

use backend::domain::ports::{
    NoOpWeatherLookupMetrics, WeatherLookupMetrics, WeatherQuery, WeatherRepository,
};
use backend::domain::{WeatherRefreshPorts, WeatherRefreshService};
use backend::inbound::http::state::HttpState;
use backend::outbound::memory::InMemoryWeatherRepository;
use backend::outbound::persistence::{DbPool, DieselWeatherRepository};

use super::ServerConfig;

/// Pick the store: PostgreSQL when a pool is configured, memory otherwise.
fn build_repository(db_pool: Option<&DbPool>) -> Arc<dyn WeatherRepository> {
    match db_pool {
        Some(pool) => {
            info!(store = "postgres", "weather store selected");
            Arc::new(DieselWeatherRepository::new(pool.clone()))
        }
        None => {
            info!(store = "memory", "weather store selected");
            Arc::new(InMemoryWeatherRepository::new())
        }
    }
}

/// Build lookup metrics, registering Prometheus counters when a registry is
/// available.
///
/// # Errors
/// Returns [`std::io::Error`] if Prometheus metric registration fails.
#[cfg(feature = "metrics")]
pub(super) fn build_lookup_metrics(
    registry: Option<&prometheus::Registry>,
) -> std::io::Result<Arc<dyn WeatherLookupMetrics>> {
    use backend::outbound::metrics::PrometheusWeatherLookupMetrics;

    match registry {
        Some(registry) => {
            let metrics = PrometheusWeatherLookupMetrics::new(registry).map_err(|e| {
                std::io::Error::other(format!("weather metrics registration failed: {e}"))
            })?;
            Ok(Arc::new(metrics))
        }
        None => Ok(Arc::new(NoOpWeatherLookupMetrics)),
    }
}

/// Build the lookup service and wrap it in HTTP state.
pub(super) fn build_http_state(
    config: &ServerConfig,
    metrics: Arc<dyn WeatherLookupMetrics>,
) -> web::Data<HttpState> {
    let ports = WeatherRefreshPorts::new(
        build_repository(config.db_pool.as_ref()),
        config.weather_source.clone(),
    )
    .with_metrics(metrics);
    let service = WeatherRefreshService::new(ports, Arc::new(DefaultClock), config.refresh_policy);
    info!(
        refresh_interval_secs = config.refresh_policy.interval().as_secs(),
        "weather refresh service ready"
    );
    let weather: Arc<dyn WeatherQuery> = Arc::new(service);
    web::Data::new(HttpState::new(weather))
}

/// Metrics sink used when the `metrics` feature is off.
#[cfg(not(feature = "metrics"))]
pub(super) fn noop_lookup_metrics() -> Arc<dyn WeatherLookupMetrics> {
    Arc::new(NoOpWeatherLookupMetrics)
}
