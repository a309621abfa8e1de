//! Driven port for the persistent weather store.
//!
//! One record per city. Reads never fabricate data and writes replace every
//! field of the existing row, so adapters only need a keyed table with an
//! upsert.

use async_trait::async_trait;

use crate::domain::{CityName, WeatherRecord};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by weather store adapters.
    pub enum WeatherRepositoryError {
        /// Store connection could not be obtained.
        Connection { message: String } => "weather store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "weather store query failed: {message}",
    }
}

/// Keyed store of the last known weather per city.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherRepository: Send + Sync {
    /// Return the stored record for `city`, or `None` when never written.
    async fn find_by_city(
        &self,
        city: &CityName,
    ) -> Result<Option<WeatherRecord>, WeatherRepositoryError>;

    /// Create or fully replace the record for `record.city()`.
    ///
    /// Concurrent writes for the same city resolve as last-write-wins.
    async fn upsert(&self, record: &WeatherRecord) -> Result<(), WeatherRepositoryError>;
}

/// Fixture store that never holds anything and accepts every write.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureWeatherRepository;

#[async_trait]
impl WeatherRepository for FixtureWeatherRepository {
    async fn find_by_city(
        &self,
        _city: &CityName,
    ) -> Result<Option<WeatherRecord>, WeatherRepositoryError> {
        Ok(None)
    }

    async fn upsert(&self, _record: &WeatherRecord) -> Result<(), WeatherRepositoryError> {
        Ok(())
    }
}
