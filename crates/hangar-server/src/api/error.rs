//! Translation of domain errors into HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hangar_core::Error;
use serde_json::json;
use tracing::error;

pub type ApiResult<T> = Result<T, HttpError>;

/// Wrapper giving domain errors an `IntoResponse` impl. Bodies are always
/// `{"error": message}`, matching what the legacy client parses.
pub struct HttpError(pub Error);

impl From<Error> for HttpError {
    fn from(err: Error) -> Self {
        HttpError(err)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            Error::Validation(msg)
            | Error::InvalidReference(msg)
            | Error::Duplicate(msg)
            | Error::InUse(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg),
            Error::ImportFailed(detail) => {
                error!(%detail, "Snapshot import rolled back");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("import failed: {detail}"),
                )
            }
            // The detail stays in the log; the body is deliberately generic.
            Error::Internal(detail) => {
                error!(%detail, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
