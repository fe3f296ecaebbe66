//! # Custom Extractors & Validation
//!
//! Provides the [`Validate`] trait for request DTOs and helpers to extract
//! and validate JSON bodies in handlers.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Request types that check business rules beyond what serde enforces.
pub trait Validate {
    /// Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to
/// [`AppError::BadRequest`].
///
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Shared check for required string fields.
pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(String);

    impl Validate for Named {
        fn validate(&self) -> Result<(), String> {
            require_non_empty("name", &self.0)
        }
    }

    #[test]
    fn validated_json_passes_through() {
        let value = extract_validated_json(Ok(Json(Named("alice".into())))).unwrap();
        assert_eq!(value.0, "alice");
    }

    #[test]
    fn validation_failure_is_422() {
        let err = extract_validated_json(Ok(Json(Named("  ".into())))).err().unwrap();
        match err {
            AppError::Validation(msg) => assert_eq!(msg, "name must not be empty"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
