//! Driven port for the external weather provider.
//!
//! Adapters make exactly one attempt per call. Retrying is a policy decision
//! that belongs to the refresh service, which currently never retries within
//! a refresh cycle.

use async_trait::async_trait;

use crate::domain::{CityName, WeatherCondition, WeatherObservation};

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while calling the weather provider.
    pub enum WeatherSourceError {
        /// Network transport failed or the provider answered with a server error.
        Transport { message: String } =>
            "weather provider transport failed: {message}",
        /// Provider call exceeded its timeout.
        Timeout { message: String } =>
            "weather provider timeout: {message}",
        /// Provider rate-limited the request.
        RateLimited { message: String } =>
            "weather provider rate limited request: {message}",
        /// Provider refused the request (unknown city, bad key, ...).
        Rejected { status: u16, message: String } =>
            "weather provider rejected request with status {status}: {message}",
        /// Provider response could not be decoded.
        Decode { message: String } =>
            "weather provider response decode failed: {message}",
    }
}

impl WeatherSourceError {
    /// Short label suitable for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::RateLimited { .. } => "rate_limited",
            Self::Rejected { .. } => "rejected",
            Self::Decode { .. } => "decode",
        }
    }
}

/// Port for fetching current conditions for one city.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch the current observation for `city`.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use backend::domain::CityName;
    /// use backend::domain::ports::{FixtureWeatherSource, WeatherSource};
    ///
    /// let source = FixtureWeatherSource;
    /// let city = CityName::new("London")?;
    /// let observation = source.fetch_current(&city).await?;
    /// assert_eq!(observation.condition.as_str(), "Clear");
    /// ```
    async fn fetch_current(&self, city: &CityName)
    -> Result<WeatherObservation, WeatherSourceError>;
}

/// Fixture source reporting clear skies everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureWeatherSource;

#[async_trait]
impl WeatherSource for FixtureWeatherSource {
    async fn fetch_current(
        &self,
        _city: &CityName,
    ) -> Result<WeatherObservation, WeatherSourceError> {
        Ok(WeatherObservation {
            condition: WeatherCondition::new("Clear"),
            temperature: 20.0,
        })
    }
}
