//! Domain primitives, ports, and the weather refresh service.
//!
//! Purpose: hold the cache policy and the types it operates on, free of HTTP,
//! SQL, or provider wire details. Adapters under `inbound` and `outbound`
//! depend on this module, never the reverse.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - CityName, WeatherRecord, RefreshPolicy: cached state and its deadline.
//! - WeatherRefreshService: cache-aside lookup over the store and provider.
//! - TraceId: request correlation identifier in task-local storage.

pub mod error;
pub mod ports;
mod refresh_locks;
pub mod trace_id;
pub mod weather;
mod weather_service;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::refresh_locks::{RefreshGuard, RefreshLocks};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::weather::{
    CityName, CityNameValidationError, RefreshPolicy, RefreshPolicyError, UNKNOWN_CONDITION,
    WeatherCondition, WeatherObservation, WeatherRecord,
};
pub use self::weather_service::{WeatherRefreshPorts, WeatherRefreshService};
