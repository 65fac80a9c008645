//! Error responses for the HTTP layer.

use crate::error::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// JSON body sent with a 500.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Display text of the underlying store error. Not a stable contract.
    pub error: String,
}

/// Failure of a single request. Each variant maps to exactly one response.
#[derive(Debug)]
pub enum ApiError {
    /// No book with the requested id.
    NotFound,
    /// The store failed, usually while persisting a write.
    Storage(Error),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Storage(e)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotFound => write!(f, "not found"),
            ApiError::Storage(e) => write!(f, "storage failure: {e}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                let body = Json(ErrorResponse {
                    error: e.to_string(),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}
