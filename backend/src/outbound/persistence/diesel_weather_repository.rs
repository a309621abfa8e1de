//! PostgreSQL-backed weather store.
//!
//! Reads are point lookups on the `city` primary key. Writes use
//! `INSERT ... ON CONFLICT (city) DO UPDATE` so the first write creates the row
//! and every later one replaces all of its columns.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{WeatherRepository, WeatherRepositoryError};
use crate::domain::{CityName, WeatherCondition, WeatherRecord};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CurrentWeatherRow, NewCurrentWeatherRow};
use super::pool::DbPool;
use super::schema::current_weather;

/// Diesel-backed implementation of [`WeatherRepository`].
#[derive(Clone)]
pub struct DieselWeatherRepository {
    pool: DbPool,
}

impl DieselWeatherRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: CurrentWeatherRow) -> Result<WeatherRecord, WeatherRepositoryError> {
    let city = CityName::new(row.city.as_str()).map_err(|err| {
        warn!(city = %row.city, error = %err, "stored city name fails validation");
        WeatherRepositoryError::query(format!("stored city name is invalid: {err}"))
    })?;
    Ok(WeatherRecord::from_parts(
        city,
        WeatherCondition::new(row.weather),
        row.temperature,
        row.next_update,
    ))
}

fn record_to_row(record: &WeatherRecord) -> NewCurrentWeatherRow<'_> {
    NewCurrentWeatherRow {
        city: record.city().as_str(),
        weather: record.condition().as_str(),
        temperature: record.temperature(),
        next_update: record.next_refresh_at(),
    }
}

#[async_trait]
impl WeatherRepository for DieselWeatherRepository {
    async fn find_by_city(
        &self,
        city: &CityName,
    ) -> Result<Option<WeatherRecord>, WeatherRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = current_weather::table
            .filter(current_weather::city.eq(city.as_str()))
            .select(CurrentWeatherRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_record).transpose()
    }

    async fn upsert(&self, record: &WeatherRecord) -> Result<(), WeatherRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(current_weather::table)
            .values(&record_to_row(record))
            .on_conflict(current_weather::city)
            .do_update()
            .set((
                current_weather::weather.eq(excluded(current_weather::weather)),
                current_weather::temperature.eq(excluded(current_weather::temperature)),
                current_weather::next_update.eq(excluded(current_weather::next_update)),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn row(city: &str) -> CurrentWeatherRow {
        CurrentWeatherRow {
            city: city.to_owned(),
            weather: "Rain".to_owned(),
            temperature: 12.5,
            next_update: Utc
                .with_ymd_and_hms(2026, 3, 1, 13, 0, 0)
                .single()
                .expect("valid timestamp"),
        }
    }

    #[rstest]
    fn rows_map_to_records_field_for_field() {
        let source = row("London");
        let record = row_to_record(source.clone()).expect("valid row");

        assert_eq!(record.city().as_str(), source.city);
        assert_eq!(record.condition().as_str(), source.weather);
        assert_eq!(record.temperature(), source.temperature);
        assert_eq!(record.next_refresh_at(), source.next_update);

        let back = record_to_row(&record);
        assert_eq!(back.city, "London");
        assert_eq!(back.weather, "Rain");
        assert_eq!(back.next_update, source.next_update);
    }

    #[rstest]
    fn blank_city_rows_are_query_errors() {
        let err = row_to_record(row("  ")).expect_err("blank city rejected");
        assert!(matches!(err, WeatherRepositoryError::Query { .. }));
    }
}
