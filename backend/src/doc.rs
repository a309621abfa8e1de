//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the weather lookup and health check paths together
//! with the response and error schemas. The document backs Swagger UI in
//! debug builds and is exported by `cargo run --bin openapi-dump`.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::weather::WeatherResponse;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weather Service API",
        description = "Current weather lookups backed by a refresh-on-expiry cache, plus health checks."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::weather::get_weather,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(WeatherResponse, Error, ErrorCode)),
    tags(
        (name = "weather", description = "Current weather lookups"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
