//! # Custom Extractors & Validation
//!
//! Helpers that turn Axum rejections and malformed identifiers into
//! [`AppError`]s with stable codes.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::Json;

use credreg_core::ValidationError;

use crate::error::AppError;

/// Request types with rules beyond what serde checks.
pub trait Validate {
    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract query parameters, mapping failures to [`AppError::BadRequest`].
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract query parameters and validate them using [`Validate`].
pub fn extract_validated_query<T: Validate>(
    result: Result<Query<T>, QueryRejection>,
) -> Result<T, AppError> {
    let value = extract_query(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Parse a hex path segment into a key or identity newtype.
pub fn parse_hex<T>(raw: &str) -> Result<T, AppError>
where
    T: std::str::FromStr<Err = ValidationError>,
{
    raw.parse::<T>().map_err(AppError::from)
}
