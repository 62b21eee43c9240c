// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON error responses.
//!
//! Every error leaves the gateway as `{"error": CODE, "message": ...}` with
//! the matching HTTP status.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code, e.g. `RATE_LIMIT`.
    pub error: &'static str,
    /// Human-readable description.
    pub message: String,
}

/// An HTTP error with a status, an error code, and a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED", message)
    }

    pub fn payload_too_large(limit: usize) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "PAYLOAD_TOO_LARGE",
            format!("Request body exceeds {limit} bytes"),
        )
    }

    pub fn rate_limited() -> Self {
        Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "RATE_LIMIT",
            "Too many requests. Please try again later.",
        )
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Internal server error",
        )
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = self.code, "{}", self.message);
        } else {
            tracing::debug!(code = self.code, status = %self.status, "{}", self.message);
        }

        let body = ErrorBody {
            error: self.code,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_status_and_code() {
        assert_eq!(ApiError::validation("x").status, StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found("x").code, "NOT_FOUND");
        assert_eq!(
            ApiError::method_not_allowed("x").status,
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(ApiError::rate_limited().status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError::payload_too_large(10).code, "PAYLOAD_TOO_LARGE");
        assert_eq!(ApiError::internal().code, "INTERNAL_ERROR");
    }

    #[test]
    fn display_includes_code() {
        let err = ApiError::rate_limited();
        assert!(err.to_string().starts_with("[RATE_LIMIT]"));
    }

    #[test]
    fn into_response_uses_status() {
        let response = ApiError::not_found("no such route").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
