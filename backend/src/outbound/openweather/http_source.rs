//! Reqwest-backed OpenWeather source adapter.
//!
//! This adapter owns transport details only: request construction, timeout and
//! HTTP error mapping, and JSON decoding into domain observations.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::CurrentWeatherDto;
use crate::domain::ports::{WeatherSource, WeatherSourceError};
use crate::domain::{CityName, WeatherObservation};

const CURRENT_WEATHER_PATH: &str = "data/2.5/weather";
const DEFAULT_USER_AGENT: &str = concat!("weather-backend/", env!("CARGO_PKG_VERSION"));

/// Outbound identity sent with every provider request.
pub struct OpenWeatherHttpIdentity {
    /// HTTP user-agent sent to the provider.
    pub user_agent: String,
}

impl Default for OpenWeatherHttpIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// OpenWeather source adapter issuing one GET per lookup.
pub struct OpenWeatherHttpSource {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
    user_agent: String,
}

impl OpenWeatherHttpSource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    /// ```rust,ignore
    /// let base = Url::parse("https://api.openweathermap.org")?;
    /// let source = OpenWeatherHttpSource::new(base, Some(key), Duration::from_secs(10))?;
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Self::with_identity(base_url, api_key, timeout, OpenWeatherHttpIdentity::default())
    }

    /// Build an adapter with an explicit outbound identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_identity(
        base_url: Url,
        api_key: Option<String>,
        timeout: Duration,
        identity: OpenWeatherHttpIdentity,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: current_weather_endpoint(base_url),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            user_agent: identity.user_agent,
        })
    }

    /// Fully resolved endpoint URL, without query parameters.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherHttpSource {
    async fn fetch_current(
        &self,
        city: &CityName,
    ) -> Result<WeatherObservation, WeatherSourceError> {
        let mut request = self
            .client
            .get(self.endpoint.clone())
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("q", city.as_str())]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("appid", key.as_str())]);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(city = %city, status = status.as_u16(), bytes = body.len(), "provider responded");
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_observation(body.as_ref())
    }
}

/// Append the current-weather path to `base`, keeping any path prefix.
fn current_weather_endpoint(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.set_query(None);
    base.join(CURRENT_WEATHER_PATH).unwrap_or(base)
}

fn parse_observation(body: &[u8]) -> Result<WeatherObservation, WeatherSourceError> {
    let decoded: CurrentWeatherDto = serde_json::from_slice(body).map_err(|error| {
        WeatherSourceError::decode(format!("invalid current weather JSON payload: {error}"))
    })?;
    decoded
        .into_observation()
        .map_err(WeatherSourceError::decode)
}

// The request URL carries the API key, so it is stripped before the error
// text leaves the adapter.
fn map_transport_error(error: reqwest::Error) -> WeatherSourceError {
    let timed_out = error.is_timeout();
    let message = error.without_url().to_string();
    if timed_out {
        WeatherSourceError::timeout(message)
    } else {
        WeatherSourceError::transport(message)
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> WeatherSourceError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => WeatherSourceError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            WeatherSourceError::timeout(message)
        }
        _ if status.is_client_error() => WeatherSourceError::rejected(status.as_u16(), message),
        _ => WeatherSourceError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
