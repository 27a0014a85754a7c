//! Typed request bodies validated at the boundary

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Field-level checks run after a body has been deserialized
pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

/// JSON body extractor that rejects malformed and invalid input with a `ValidationError`
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Path extractor whose rejection is a JSON `ValidationError`
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation("Invalid path parameter".to_string()))?;
        Ok(Self(value))
    }
}

/// Query-string extractor whose rejection is a JSON `ValidationError`
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation("Invalid query string".to_string()))?;
        Ok(Self(value))
    }
}

/// Require `value` to be between `min` and `max` characters long
pub fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), ApiError> {
    let len = value.chars().count();
    if len < min {
        return Err(if min == 1 {
            ApiError::Validation(format!("{} cannot be empty", field))
        } else {
            ApiError::Validation(format!("{} must be at least {} characters long", field, min))
        });
    }
    if len > max {
        return Err(ApiError::Validation(format!(
            "{} exceeds maximum length of {} characters",
            field, max
        )));
    }
    Ok(())
}

/// Require a non-blank value within `max` characters
pub fn check_text(field: &str, value: &str, max: usize) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{} cannot be empty", field)));
    }
    check_length(field, value, 1, max)
}
