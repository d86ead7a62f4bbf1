//! API error responses
//!
//! Handlers map failures onto a small set of HTTP shapes: not-found gets a
//! 404, everything else gets a route-specific generic message with the
//! detail kept in the logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors surfaced by API handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    NotFound { message: &'static str },

    #[error("{message}")]
    Internal {
        message: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub fn not_found(message: &'static str) -> Self {
        Self::NotFound { message }
    }

    /// Wrap an underlying failure. `message` is what the client sees;
    /// the source only reaches the logs.
    pub fn internal(message: &'static str, source: impl std::fmt::Display) -> Self {
        Self::Internal {
            message,
            detail: source.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound { message } => (StatusCode::NOT_FOUND, *message),
            ApiError::Internal { message, detail } => {
                tracing::error!(detail = %detail, "{}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, *message)
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_shape() {
        let response = ApiError::not_found("Card not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_hides_detail() {
        let err = ApiError::internal("Search failed", "Database error: disk I/O");
        assert_eq!(err.to_string(), "Search failed");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
