//! Current weather lookup endpoint.
//!
//! ```text
//! GET /api/weather?city=London
//! ```
//!
//! The handler validates the city, asks the [`WeatherQuery`] port for the
//! best-known record, and renders `{city, weather, temperature}`. Provider and
//! store trouble never reach the client as errors: the port folds them into a
//! placeholder record or a store-failure note, which is only logged here.
//!
//! [`WeatherQuery`]: crate::domain::ports::WeatherQuery

use actix_web::{HttpResponse, get, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::WeatherLookup;
use crate::domain::{CityName, CityNameValidationError, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::no_store_header;
use crate::inbound::http::state::HttpState;

/// Query string accepted by the lookup endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeatherParams {
    /// City to look up, matched exactly after trimming.
    #[param(example = "London")]
    pub city: Option<String>,
}

/// Current conditions for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherResponse {
    /// City name as requested.
    #[schema(example = "London")]
    pub city: String,
    /// Headline condition, or `Unknown` when the provider was unavailable.
    #[schema(example = "Rain")]
    pub weather: String,
    /// Temperature as reported by the provider; 0 for placeholders.
    #[schema(example = 284.15)]
    pub temperature: f64,
}

impl From<&WeatherLookup> for WeatherResponse {
    fn from(lookup: &WeatherLookup) -> Self {
        let record = &lookup.record;
        Self {
            city: record.city().as_str().to_owned(),
            weather: record.condition().as_str().to_owned(),
            temperature: record.temperature(),
        }
    }
}

fn parse_city(raw: Option<&str>) -> Result<CityName, Error> {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    CityName::new(trimmed).map_err(|err| {
        let code = match err {
            CityNameValidationError::Empty => "missing_field",
            CityNameValidationError::SurroundingWhitespace => "invalid_value",
        };
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "city",
            "code": code,
        }))
    })
}

/// Look up the current weather for a city.
#[utoipa::path(
    get,
    path = "/api/weather",
    params(WeatherParams),
    responses(
        (
            status = 200,
            description = "Current weather for the city",
            headers(("Cache-Control" = String, description = "Always no-store")),
            body = WeatherResponse
        ),
        (status = 400, description = "Missing or invalid city", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["weather"],
    operation_id = "getCurrentWeather"
)]
#[get("/weather")]
pub async fn get_weather(
    state: web::Data<HttpState>,
    params: web::Query<WeatherParams>,
) -> ApiResult<HttpResponse> {
    let city = parse_city(params.city.as_deref())?;
    let lookup = state.weather.current_weather(&city).await?;

    if let Some(failure) = &lookup.store_failure {
        warn!(city = %city, error = %failure, "weather served without a durable store write");
    }
    debug!(city = %city, origin = lookup.origin.as_str(), "weather lookup served");

    Ok(HttpResponse::Ok()
        .insert_header(no_store_header())
        .json(WeatherResponse::from(&lookup)))
}
