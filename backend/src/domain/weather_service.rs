//! Cache-aside refresh service for current weather.
//!
//! [`WeatherRefreshService`] is the only place that decides whether a stored
//! record may be served or must be re-fetched. The rules:
//!
//! - a record whose deadline lies in the future is served as-is and the
//!   provider is not contacted;
//! - a missing record, or one whose deadline has been reached, triggers a
//!   single provider call; the result (or the `"Unknown"` placeholder when the
//!   call fails) is written back with a fresh deadline and returned;
//! - store failures never fail the lookup: a failed read counts as a miss and
//!   a failed write still returns the freshly built record, with the failure
//!   reported on [`WeatherLookup::store_failure`].
//!
//! Refreshes of the same city are serialised so a burst of requests for a
//! stale city produces one provider call; the others re-read the store once
//! the refresh lock is theirs and find the fresh record.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use super::ports::{
    LookupOrigin, NoOpWeatherLookupMetrics, WeatherLookup, WeatherLookupMetrics, WeatherQuery,
    WeatherRepository, WeatherRepositoryError, WeatherSource,
};
use super::{CityName, Error, RefreshLocks, RefreshPolicy, WeatherRecord};

/// Driven ports required by the refresh service.
#[derive(Clone)]
pub struct WeatherRefreshPorts {
    /// Persistent weather store.
    pub repository: Arc<dyn WeatherRepository>,
    /// External weather provider.
    pub source: Arc<dyn WeatherSource>,
    /// Lookup outcome metrics.
    pub metrics: Arc<dyn WeatherLookupMetrics>,
}

impl WeatherRefreshPorts {
    /// Bundle store and provider with metrics disabled.
    pub fn new(repository: Arc<dyn WeatherRepository>, source: Arc<dyn WeatherSource>) -> Self {
        Self {
            repository,
            source,
            metrics: Arc::new(NoOpWeatherLookupMetrics),
        }
    }

    /// Replace the metrics sink.
    pub fn with_metrics(mut self, metrics: Arc<dyn WeatherLookupMetrics>) -> Self {
        self.metrics = metrics;
        self
    }
}

/// Domain service implementing [`WeatherQuery`] over a store and a provider.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use backend::domain::ports::{
///     FixtureWeatherRepository, FixtureWeatherSource, WeatherQuery,
/// };
/// use backend::domain::{CityName, RefreshPolicy, WeatherRefreshPorts, WeatherRefreshService};
/// use mockable::DefaultClock;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let service = WeatherRefreshService::new(
///     WeatherRefreshPorts::new(
///         Arc::new(FixtureWeatherRepository),
///         Arc::new(FixtureWeatherSource),
///     ),
///     Arc::new(DefaultClock),
///     RefreshPolicy::default(),
/// );
/// let city = CityName::new("London").expect("valid city");
/// let lookup = service.current_weather(&city).await.expect("lookup succeeds");
/// assert_eq!(lookup.record.city(), &city);
/// # });
/// ```
pub struct WeatherRefreshService {
    repository: Arc<dyn WeatherRepository>,
    source: Arc<dyn WeatherSource>,
    metrics: Arc<dyn WeatherLookupMetrics>,
    clock: Arc<dyn Clock>,
    policy: RefreshPolicy,
    locks: RefreshLocks,
}

impl WeatherRefreshService {
    /// Build the service from its ports, clock, and refresh policy.
    pub fn new(ports: WeatherRefreshPorts, clock: Arc<dyn Clock>, policy: RefreshPolicy) -> Self {
        Self {
            repository: ports.repository,
            source: ports.source,
            metrics: ports.metrics,
            clock,
            policy,
            locks: RefreshLocks::new(),
        }
    }

    /// Refresh policy in force.
    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Look up `city`, refreshing it from the provider when missing or stale.
    pub async fn get_or_retrieve(&self, city: &CityName) -> WeatherLookup {
        match self.read_fresh(city).await {
            Ok(Some(record)) => return self.serve_cached(record).await,
            Ok(None) => {}
            Err(error) => {
                debug!(city = %city, %error, "optimistic weather read failed");
            }
        }

        let _claim = self.locks.acquire(city).await;

        // Another task may have refreshed the city while we waited.
        let store_failure = match self.read_fresh(city).await {
            Ok(Some(record)) => return self.serve_cached(record).await,
            Ok(None) => None,
            Err(error) => {
                warn!(city = %city, %error, "weather store read failed; treating as miss");
                Some(error)
            }
        };

        self.refresh(city, store_failure).await
    }

    async fn read_fresh(
        &self,
        city: &CityName,
    ) -> Result<Option<WeatherRecord>, WeatherRepositoryError> {
        let record = self.repository.find_by_city(city).await?;
        let now = self.clock.utc();
        Ok(record.filter(|record| !record.is_stale_at(now)))
    }

    async fn serve_cached(&self, record: WeatherRecord) -> WeatherLookup {
        debug!(
            city = %record.city(),
            next_refresh_at = %record.next_refresh_at(),
            "serving cached weather"
        );
        self.record_lookup(LookupOrigin::Cached).await;
        WeatherLookup::cached(record)
    }

    async fn refresh(
        &self,
        city: &CityName,
        mut store_failure: Option<WeatherRepositoryError>,
    ) -> WeatherLookup {
        let fetched = self.source.fetch_current(city).await;
        let next_refresh_at = self.policy.next_refresh_at(self.clock.utc());

        let (record, origin) = match fetched {
            Ok(observation) => {
                info!(
                    city = %city,
                    condition = %observation.condition,
                    temperature = observation.temperature,
                    %next_refresh_at,
                    "refreshed weather from provider"
                );
                (
                    WeatherRecord::observed(city.clone(), observation, next_refresh_at),
                    LookupOrigin::Refreshed,
                )
            }
            Err(error) => {
                warn!(
                    city = %city,
                    kind = error.kind(),
                    %error,
                    %next_refresh_at,
                    "weather provider failed; storing placeholder"
                );
                if let Err(metrics_error) = self.metrics.record_provider_failure(error.kind()).await
                {
                    debug!(%metrics_error, "failed to record provider failure metric");
                }
                (
                    WeatherRecord::placeholder(city.clone(), next_refresh_at),
                    LookupOrigin::Placeholder,
                )
            }
        };

        if let Err(error) = self.repository.upsert(&record).await {
            warn!(city = %city, %error, "failed to persist refreshed weather");
            store_failure = Some(error);
        }

        self.record_lookup(origin).await;
        WeatherLookup {
            record,
            origin,
            store_failure,
        }
    }

    async fn record_lookup(&self, origin: LookupOrigin) {
        // Exporter failures must not affect the lookup result.
        if let Err(error) = self.metrics.record_lookup(origin).await {
            debug!(%error, origin = origin.as_str(), "failed to record lookup metric");
        }
    }
}

#[async_trait]
impl WeatherQuery for WeatherRefreshService {
    async fn current_weather(&self, city: &CityName) -> Result<WeatherLookup, Error> {
        Ok(self.get_or_retrieve(city).await)
    }
}

#[cfg(test)]
#[path = "weather_service_tests.rs"]
mod tests;
