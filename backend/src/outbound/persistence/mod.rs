//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Provides the production [`WeatherRepository`](crate::domain::ports::WeatherRepository)
//! backed by PostgreSQL via Diesel with async support through `diesel-async`
//! and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: the repository only translates between Diesel rows
//!   and domain records. Cache policy lives in the domain service.
//! - **Internal models**: row structs (`models.rs`) and schema definitions
//!   (`schema.rs`) are never exposed to the domain layer.
//! - **Strongly typed errors**: database and pool errors map to
//!   `WeatherRepositoryError`.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, DieselWeatherRepository, PoolConfig};
//!
//! let config = PoolConfig::new("postgres://localhost/weather");
//! let pool = DbPool::new(config).await?;
//! let repo = DieselWeatherRepository::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_weather_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_weather_repository::DieselWeatherRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{ConnectionParts, DbPool, PoolConfig, PoolError};
