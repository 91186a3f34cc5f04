//! Request extractors for the products API.

use axum::{
    extract::{Form, FromRequest, FromRequestParts, Json, Path, Request},
    http::{header::CONTENT_TYPE, request::Parts},
};
use serde::de::DeserializeOwned;

use crate::error::ProductError;

pub const NUMERIC_ID_MESSAGE: &str = "Validation failed (numeric string is expected)";

/// Integer `{id}` path parameter.
///
/// Anything that does not parse as an `i32` is rejected with a `400` before
/// the handler runs.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub i32);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ProductError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ProductError::bad_request(e.body_text()))?;

        raw.parse::<i32>()
            .map(IdPath)
            .map_err(|_| ProductError::bad_request(NUMERIC_ID_MESSAGE))
    }
}

/// Body extractor accepting `application/x-www-form-urlencoded` or JSON.
///
/// Malformed bodies are rejected as `400` with the parser's message.
pub struct JsonOrForm<T>(pub T);

impl<T, S> FromRequest<S> for JsonOrForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProductError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(data) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ProductError::bad_request(e.body_text()))?;
            Ok(JsonOrForm(data))
        } else {
            let Json(data) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| ProductError::bad_request(e.body_text()))?;
            Ok(JsonOrForm(data))
        }
    }
}
