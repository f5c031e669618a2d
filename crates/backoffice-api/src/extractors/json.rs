//! JSON body extractor that runs `validator` rules.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use backoffice_core::error::AppError;

use crate::error::ApiError;

/// Like `Json<T>`, but malformed bodies and rule violations both come back
/// as `VALIDATION_ERROR` in the standard error body.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;

        value.validate().map_err(|errors| {
            let mut err = AppError::validation("Request validation failed");
            if let Ok(fields) = serde_json::to_value(&errors) {
                err = err.with_details(serde_json::json!({ "fields": fields }));
            }
            err
        })?;

        Ok(Self(value))
    }
}
