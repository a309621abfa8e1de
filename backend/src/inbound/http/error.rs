//! Actix mapping for domain errors.
//!
//! Handlers return [`ApiResult`] and the domain [`Error`] becomes a JSON body
//! whose status follows its code. Internal failures are logged in full and
//! reach the client as a generic message that keeps only the trace id. Error
//! responses are never cached, same as the lookup results they stand in for.

use std::borrow::Cow;

use actix_web::error::QueryPayloadError;
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use serde_json::json;
use tracing::{error, warn};

use super::cache_control::no_store_header;
use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The payload a client is allowed to see.
fn client_view(error: &Error) -> Cow<'_, Error> {
    match error.code() {
        ErrorCode::InternalError => {
            let redacted = Error::internal(REDACTED_MESSAGE);
            Cow::Owned(match error.trace_id() {
                Some(id) => redacted.with_trace_id(id),
                None => redacted,
            })
        }
        ErrorCode::InvalidRequest | ErrorCode::NotFound => Cow::Borrowed(error),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(
                code = ?self.code(),
                message = %self.message(),
                trace_id = self.trace_id().unwrap_or("-"),
                "request failed"
            );
        }

        let mut builder = HttpResponse::build(status);
        builder.insert_header(no_store_header());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id));
        }
        builder.json(client_view(self))
    }
}

/// Report an unparsable query string as `invalid_request`.
///
/// Without this actix answers with a plain-text 400 that carries neither the
/// JSON error shape nor the trace id.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!(error = %err, "rejected malformed query string");
    Error::invalid_request("query string could not be parsed")
        .with_details(json!({ "code": "invalid_query" }))
        .into()
}

/// Query extractor configuration that routes failures through
/// [`query_error_handler`].
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error_handler)
}
