pub mod chat;
pub mod tool;
pub mod tools;

use super::dto::ErrorResponse;
use axum::Json;
use axum::http::StatusCode;

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}
