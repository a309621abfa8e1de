//! Backend entry-point: loads settings, prepares the weather store and
//! provider, and serves the lookup API with health checks and OpenAPI docs.

mod server;

use std::sync::Arc;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::outbound::openweather::OpenWeatherHttpSource;
use backend::outbound::persistence::{DbPool, run_pending_migrations};
use backend::settings::{AppSettings, DatabaseSettings};
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(std::io::Error::other)?;
    let config = build_server_config(&settings).await?;

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(initialize_metrics(|| {
        PrometheusMetricsBuilder::new("weather")
            .endpoint("/metrics")
            .build()
    }));

    let bind_addr = config.bind_addr();
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "weather service listening");
    server.await
}

async fn build_server_config(settings: &AppSettings) -> std::io::Result<ServerConfig> {
    let weather = &settings.weather;
    let appid = weather.appid().map(str::to_owned);
    if appid.is_none() {
        warn!("WEATHER_APPID is not set; provider requests will be sent without a key");
    }
    let source = OpenWeatherHttpSource::new(
        weather.base_url().map_err(std::io::Error::other)?,
        appid,
        weather.timeout().map_err(std::io::Error::other)?,
    )
    .map_err(|e| std::io::Error::other(format!("failed to build provider client: {e}")))?;
    info!(endpoint = %source.endpoint(), "weather provider configured");

    let config = ServerConfig::new(
        settings.server.bind_addr().map_err(std::io::Error::other)?,
        Arc::new(source),
        weather.refresh_policy().map_err(std::io::Error::other)?,
    );

    if settings.database.enabled {
        Ok(config.with_db_pool(connect_database(&settings.database).await?))
    } else {
        info!("POSTGRES_ENABLED is false; records are kept in memory for this process only");
        Ok(config)
    }
}

async fn connect_database(settings: &DatabaseSettings) -> std::io::Result<DbPool> {
    let pool_config = settings.pool_config().map_err(std::io::Error::other)?;
    let applied = run_pending_migrations(pool_config.database_url())
        .await
        .map_err(std::io::Error::other)?;
    info!(
        host = settings.host(),
        database = settings.db(),
        applied,
        "database migrations complete"
    );
    DbPool::new(pool_config)
        .await
        .map_err(std::io::Error::other)
}

/// Build Prometheus middleware, logging and continuing without it on failure.
#[cfg(feature = "metrics")]
fn initialize_metrics<F, E>(build: F) -> Option<PrometheusMetrics>
where
    F: FnOnce() -> Result<PrometheusMetrics, E>,
    E: std::fmt::Display,
{
    match build() {
        Ok(metrics) => Some(metrics),
        Err(e) => {
            warn!(error = %e, "Prometheus metrics unavailable; continuing without /metrics");
            None
        }
    }
}
