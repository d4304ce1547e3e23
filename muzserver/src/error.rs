//! HTTP error mapping for the API handlers

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Error returned by API handlers, rendered as `{"error": "..."}`
#[derive(Debug)]
pub enum AppError {
    /// Malformed request (missing/empty query, bad body shape)
    Validation(String),
    /// Resolution, pipeline or store failure surfaced to the client
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Internal(message) => {
                tracing::error!("Request failed: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
