//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::WeatherQuery;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub weather: Arc<dyn WeatherQuery>,
}

impl HttpState {
    /// Construct state from the weather lookup port.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use backend::domain::ports::FixtureWeatherQuery;
    /// use backend::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(Arc::new(FixtureWeatherQuery::default()));
    /// let _weather = state.weather.clone();
    /// ```
    pub fn new(weather: Arc<dyn WeatherQuery>) -> Self {
        Self { weather }
    }
}
