//! # Custom Extractors & Validation
//!
//! Provides the [`Validate`] trait for form DTOs and helpers that turn
//! JSON and form rejections into [`AppError::BadRequest`].

use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::{Form, Json};

use crate::error::AppError;

/// Trait for request types that can validate their business rules
/// beyond what serde deserialization checks.
pub trait Validate {
    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
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

/// Extract an urlencoded form and validate it using the [`Validate`] trait.
pub fn extract_validated_form<T: Validate>(
    result: Result<Form<T>, FormRejection>,
) -> Result<T, AppError> {
    let value = result
        .map(|Form(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}
