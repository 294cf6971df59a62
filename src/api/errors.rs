//! API Error Handling
//!
//! Maps webhook core failures onto HTTP status codes with request tracking.

use crate::errors::WebhookError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level API error response with request tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub request_id: String,
    pub error: ErrorBody,
}

/// Error body with structured information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error code (UNAUTHORIZED, BAD_REQUEST, ...)
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

/// API error types with request tracking
#[derive(Debug)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorKind {
    Unauthorized(String),
    BadRequest(String),
    InternalError(String),
}

impl ApiError {
    pub fn unauthorized(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized(message),
            request_id,
        }
    }

    pub fn bad_request(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::BadRequest(message),
            request_id,
        }
    }

    pub fn internal_error(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::InternalError(message),
            request_id,
        }
    }

    /// 401 for authentication failures, 400 for bodies that do not parse
    pub fn from_webhook(request_id: String, error: WebhookError) -> Self {
        match error {
            WebhookError::InvalidSignature => Self::unauthorized(request_id, error.to_string()),
            WebhookError::MalformedPayload(_) => Self::bad_request(request_id, error.to_string()),
            WebhookError::SecretRequired => Self::internal_error(request_id, error.to_string()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ApiErrorKind::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiErrorKind::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiErrorKind::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ApiErrorKind::Unauthorized(msg) => write!(f, "[{}] Unauthorized: {}", self.request_id, msg),
            ApiErrorKind::BadRequest(msg) => write!(f, "[{}] Bad Request: {}", self.request_id, msg),
            ApiErrorKind::InternalError(msg) => write!(f, "[{}] Internal Error: {}", self.request_id, msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match self.kind {
            ApiErrorKind::Unauthorized(msg) => ("UNAUTHORIZED", msg),
            ApiErrorKind::BadRequest(msg) => ("BAD_REQUEST", msg),
            ApiErrorKind::InternalError(msg) => ("INTERNAL_ERROR", msg),
        };

        let body = Json(ErrorResponse {
            request_id: self.request_id,
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_errors_map_to_statuses() {
        let error = ApiError::from_webhook("r1".to_string(), WebhookError::InvalidSignature);
        assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);

        let error = ApiError::from_webhook("r2".to_string(), WebhookError::MalformedPayload("eof".to_string()));
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);

        let error = ApiError::from_webhook("r3".to_string(), WebhookError::SecretRequired);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_display_includes_request_id() {
        let error = ApiError::bad_request("req-9".to_string(), "nope".to_string());
        assert_eq!(error.to_string(), "[req-9] Bad Request: nope");
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::unauthorized("r".to_string(), "bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
