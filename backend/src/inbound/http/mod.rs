//! HTTP inbound adapter exposing the weather lookup and operational endpoints.

pub mod cache_control;
pub mod error;
pub mod health;
pub mod index;
pub mod state;
pub mod weather;

pub use error::ApiResult;
