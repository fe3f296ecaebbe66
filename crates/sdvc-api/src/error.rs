//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps [`VcError`] and request problems to HTTP status codes with a JSON
//! body of the form `{"error": {"code", "message", "details"?}}`.
//! Internal error details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use sdvc_vc::VcError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional context for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request content violates a precondition (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// A requested disclosure field is not in the credential (422).
    #[error("field not found in credential subject: {0}")]
    FieldNotFound(String),

    /// Body is not JSON, or not the expected shape (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid bearer token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The signer failed or does not control the required key (503).
    #[error("signing unavailable: {0}")]
    SigningUnavailable(String),

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::FieldNotFound(_) => (StatusCode::UNPROCESSABLE_ENTITY, "FIELD_NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::SigningUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SIGNING_UNAVAILABLE")
            }
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::FieldNotFound(field) => Some(serde_json::json!({ "field": field })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::SigningUnavailable(_) => tracing::warn!(error = %self, "signing unavailable"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<VcError> for AppError {
    fn from(err: VcError) -> Self {
        match err {
            VcError::InvalidInput(msg) => Self::Validation(msg),
            VcError::FieldNotFound { field } => Self::FieldNotFound(field),
            VcError::MalformedInput(msg) => Self::BadRequest(msg),
            VcError::Signing(msg) => Self::SigningUnavailable(msg),
            // Floats in claims are the caller's data, not a server fault.
            VcError::Canonicalization(e) => Self::Validation(e.to_string()),
            VcError::Json(e) => Self::BadRequest(e.to_string()),
            VcError::Storage(msg) => Self::Internal(msg),
        }
    }
}

impl From<sdvc_core::CoreError> for AppError {
    fn from(err: sdvc_core::CoreError) -> Self {
        Self::from(VcError::from(err))
    }
}
