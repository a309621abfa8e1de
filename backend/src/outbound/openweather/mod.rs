//! OpenWeather outbound adapter.
//!
//! Thin HTTP implementation of the `WeatherSource` port against the
//! OpenWeather "current weather" endpoint.

mod dto;
mod http_source;

pub use http_source::{OpenWeatherHttpIdentity, OpenWeatherHttpSource};
