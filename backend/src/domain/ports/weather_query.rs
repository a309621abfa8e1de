//! Driving port for current-weather lookups.
//!
//! Inbound adapters call this port with a validated city and receive the best
//! record the service could produce. Provider and store failures are folded
//! into [`WeatherLookup`] rather than returned as errors, so the `Err` arm is
//! reserved for failures the service cannot degrade around.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{CityName, Error, WeatherRecord};

use super::WeatherRepositoryError;

/// How the returned record was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupOrigin {
    /// Served from the store without consulting the provider.
    Cached,
    /// Provider answered and the record was rebuilt from its observation.
    Refreshed,
    /// Provider failed and the "Unknown" placeholder was written instead.
    Placeholder,
}

impl LookupOrigin {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cached => "cached",
            Self::Refreshed => "refreshed",
            Self::Placeholder => "placeholder",
        }
    }
}

/// Outcome of a lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherLookup {
    /// Record to present to the caller.
    pub record: WeatherRecord,
    /// Where the record came from.
    pub origin: LookupOrigin,
    /// Store failure met on the way, if any. The record is still valid.
    pub store_failure: Option<WeatherRepositoryError>,
}

impl WeatherLookup {
    /// Lookup served straight from the store.
    pub fn cached(record: WeatherRecord) -> Self {
        Self {
            record,
            origin: LookupOrigin::Cached,
            store_failure: None,
        }
    }
}

/// Use-case port for "what is the weather in this city".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherQuery: Send + Sync {
    /// Return the current best-known weather for `city`.
    async fn current_weather(&self, city: &CityName) -> Result<WeatherLookup, Error>;
}

/// Fixture query answering with a fixed fresh record.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureWeatherQuery {
    /// Deadline stamped on every fixture record.
    pub next_refresh_at: Option<DateTime<Utc>>,
}

#[async_trait]
impl WeatherQuery for FixtureWeatherQuery {
    async fn current_weather(&self, city: &CityName) -> Result<WeatherLookup, Error> {
        let next_refresh_at = self
            .next_refresh_at
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        let record = WeatherRecord::from_parts(
            city.clone(),
            crate::domain::WeatherCondition::new("Clear"),
            20.0,
            next_refresh_at,
        );
        Ok(WeatherLookup::cached(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_query_echoes_city() {
        let city = CityName::new("Paris").expect("valid city");
        let lookup = FixtureWeatherQuery::default()
            .current_weather(&city)
            .await
            .expect("fixture lookup");

        assert_eq!(lookup.record.city(), &city);
        assert_eq!(lookup.origin, LookupOrigin::Cached);
        assert!(lookup.store_failure.is_none());
    }

    #[rstest]
    #[case(LookupOrigin::Cached, "cached")]
    #[case(LookupOrigin::Refreshed, "refreshed")]
    #[case(LookupOrigin::Placeholder, "placeholder")]
    fn origin_labels_are_stable(#[case] origin: LookupOrigin, #[case] label: &str) {
        assert_eq!(origin.as_str(), label);
    }
}
