//! In-memory weather store.
//!
//! Used when no database is configured and as the backing store for
//! integration tests. Contents do not survive a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{WeatherRepository, WeatherRepositoryError};
use crate::domain::{CityName, WeatherRecord};

/// `HashMap`-backed implementation of [`WeatherRepository`].
#[derive(Debug, Default)]
pub struct InMemoryWeatherRepository {
    records: RwLock<HashMap<CityName, WeatherRecord>>,
}

impl InMemoryWeatherRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cities held.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no cities.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl WeatherRepository for InMemoryWeatherRepository {
    async fn find_by_city(
        &self,
        city: &CityName,
    ) -> Result<Option<WeatherRecord>, WeatherRepositoryError> {
        Ok(self.records.read().await.get(city).cloned())
    }

    async fn upsert(&self, record: &WeatherRecord) -> Result<(), WeatherRepositoryError> {
        self.records
            .write()
            .await
            .insert(record.city().clone(), record.clone());
        Ok(())
    }
}
