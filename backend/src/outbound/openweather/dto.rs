//! DTOs for decoding OpenWeather current-weather responses.
//!
//! Only the two consumed fields are modelled. Everything else in the payload
//! is ignored so upstream additions never break decoding.

use serde::Deserialize;

use crate::domain::{WeatherCondition, WeatherObservation};

#[derive(Debug, Deserialize)]
pub(super) struct CurrentWeatherDto {
    #[serde(default)]
    pub(super) weather: Vec<ConditionDto>,
    pub(super) main: Option<MainDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ConditionDto {
    pub(super) main: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct MainDto {
    pub(super) temp: Option<f64>,
}

impl CurrentWeatherDto {
    /// Map to a domain observation.
    ///
    /// The first `weather` entry supplies the condition and is mandatory.
    /// A missing temperature reads as zero.
    pub(super) fn into_observation(self) -> Result<WeatherObservation, String> {
        let condition = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| "payload has no weather entries".to_owned())?;
        if condition.main.trim().is_empty() {
            return Err("weather[0].main is blank".to_owned());
        }
        let temperature = self.main.and_then(|main| main.temp).unwrap_or(0.0);
        Ok(WeatherObservation {
            condition: WeatherCondition::new(condition.main),
            temperature,
        })
    }
}
