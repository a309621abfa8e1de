//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod weather_lookup_metrics;
mod weather_query;
mod weather_repository;
mod weather_source;

pub use weather_lookup_metrics::{
    NoOpWeatherLookupMetrics, WeatherLookupMetrics, WeatherLookupMetricsError,
};
#[cfg(test)]
pub use weather_query::MockWeatherQuery;
pub use weather_query::{FixtureWeatherQuery, LookupOrigin, WeatherLookup, WeatherQuery};
#[cfg(test)]
pub use weather_repository::MockWeatherRepository;
pub use weather_repository::{FixtureWeatherRepository, WeatherRepository, WeatherRepositoryError};
#[cfg(test)]
pub use weather_source::MockWeatherSource;
pub use weather_source::{FixtureWeatherSource, WeatherSource, WeatherSourceError};
