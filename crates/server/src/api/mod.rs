pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod search;
pub mod tasks;

pub use routes::create_router;

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Error body shared by all endpoints
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error half of a handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}
