//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Registry rejections keep their failure-kind code (`ALREADY_EXISTS`,
//! `NOT_ISSUING_PARTY`, ...) and map to a fixed HTTP status per kind.
//! Internal error details are never returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use credreg_registry::{ErrorKind, RegistryError};

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "ALREADY_EXISTS", "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A registry transition was rejected.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed identifier or parameter (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid bearer token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

/// HTTP status for a registry failure kind.
pub fn status_for_kind(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthorized | ErrorKind::NotAuthorizedIssuer | ErrorKind::NotIssuingParty => {
            StatusCode::FORBIDDEN
        }
        ErrorKind::AlreadyAuthorized | ErrorKind::AlreadyExists | ErrorKind::AlreadyRevoked => {
            StatusCode::CONFLICT
        }
        ErrorKind::NotAuthorized | ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidArgument => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Registry(err) => {
                let kind = err.kind();
                (status_for_kind(kind), kind.as_str())
            }
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn is_internal(&self) -> bool {
        match self {
            Self::Internal(_) => true,
            Self::Registry(err) => err.kind() == ErrorKind::Internal,
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = if self.is_internal() {
            tracing::error!(error = %self, "internal server error");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<credreg_core::ValidationError> for AppError {
    fn from(err: credreg_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<credreg_registry::StoreError> for AppError {
    fn from(err: credreg_registry::StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}
