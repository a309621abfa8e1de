//! Weather lookup backend.
//!
//! A cache-aside service: lookups are answered from the store while a record
//! is fresh and refreshed from OpenWeather once its deadline passes. The crate
//! is laid out hexagonally, with the refresh policy in [`domain`], transports
//! in [`inbound`], and infrastructure adapters in [`outbound`].

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
