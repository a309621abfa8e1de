//! Diesel and pool error mapping for the weather store.

use tracing::debug;

use crate::domain::ports::WeatherRepositoryError;

use super::pool::PoolError;

/// Map pool failures to connection errors.
pub(crate) fn map_pool_error(error: PoolError) -> WeatherRepositoryError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    WeatherRepositoryError::connection(message)
}

/// Map Diesel failures, keeping driver text out of the returned message.
pub(crate) fn map_diesel_error(error: diesel::result::Error) -> WeatherRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "weather store operation failed");
        }
        other => debug!(error = %other, "weather store operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            WeatherRepositoryError::connection("database connection error")
        }
        DieselError::QueryBuilderError(_) => WeatherRepositoryError::query("database query error"),
        DieselError::DeserializationError(_) => {
            WeatherRepositoryError::query("stored weather row could not be decoded")
        }
        _ => WeatherRepositoryError::query("database error"),
    }
}
