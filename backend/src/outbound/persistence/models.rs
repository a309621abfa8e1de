//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::current_weather;

/// Row struct for reading from the `current_weather` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = current_weather)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CurrentWeatherRow {
    pub city: String,
    pub weather: String,
    pub temperature: f64,
    pub next_update: DateTime<Utc>,
}

/// Insertable struct for upserting a city's weather.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = current_weather)]
pub(crate) struct NewCurrentWeatherRow<'a> {
    pub city: &'a str,
    pub weather: &'a str,
    pub temperature: f64,
    pub next_update: DateTime<Utc>,
}
