//! Route handlers

pub mod health;
pub mod task;
pub mod transfer;

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            details: Vec::new(),
        }),
    )
}

/// Map a core error onto an HTTP status
pub fn core_error(err: todo_core::Error) -> ApiError {
    use todo_core::Error;

    let status = match &err {
        Error::Validation(_) | Error::ImportFormat(_) => StatusCode::BAD_REQUEST,
        Error::ImportRead(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::ImportInProgress => StatusCode::CONFLICT,
        Error::TaskNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let details = match &err {
        Error::Validation(errors) => errors.iter().map(ToString::to_string).collect(),
        _ => Vec::new(),
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            details,
        }),
    )
}
