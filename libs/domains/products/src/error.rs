use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Placeholder payload attached to an error body next to the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Payload {
    /// No `data` field at all
    #[default]
    Omitted,
    /// `"data": []`
    EmptyList,
    /// `"data": {}`
    EmptyObject,
}

impl Payload {
    fn to_value(self) -> Option<Value> {
        match self {
            Payload::Omitted => None,
            Payload::EmptyList => Some(json!([])),
            Payload::EmptyObject => Some(json!({})),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("{message}")]
    NotFound { message: String, payload: Payload },

    #[error("{message}")]
    BadRequest { message: String, payload: Payload },

    #[error("Database error: {0}")]
    Database(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl ProductError {
    /// The requested page of products is empty
    pub fn no_products() -> Self {
        ProductError::NotFound {
            message: "Could not find products.".to_string(),
            payload: Payload::EmptyList,
        }
    }

    pub fn product_not_found(id: i32) -> Self {
        ProductError::NotFound {
            message: format!("Could not find product with id {}.", id),
            payload: Payload::Omitted,
        }
    }

    pub fn category_not_found(id: i32) -> Self {
        ProductError::NotFound {
            message: format!("Could not find category with id {}.", id),
            payload: Payload::Omitted,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ProductError::BadRequest {
            message: message.into(),
            payload: Payload::Omitted,
        }
    }

    /// Replace the payload rendered next to the message. No-op for `Database`.
    pub fn with_payload(self, payload: Payload) -> Self {
        match self {
            ProductError::NotFound { message, .. } => ProductError::NotFound { message, payload },
            ProductError::BadRequest { message, .. } => {
                ProductError::BadRequest { message, payload }
            }
            other => other,
        }
    }

    /// Rewrap store failures as `BadRequest`. `NotFound` is never downgraded.
    pub fn into_bad_request(self) -> Self {
        match self {
            ProductError::Database(message) => ProductError::BadRequest {
                message,
                payload: Payload::Omitted,
            },
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ProductError::NotFound { .. })
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ProductError::NotFound { .. } => StatusCode::NOT_FOUND,
            ProductError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ProductError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Body of every error response: `{ "message": ..., "data"?: [] | {} }`
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ProductError::NotFound { message, payload } => {
                tracing::info!(status = status.as_u16(), "Not found: {}", message);
                ErrorBody {
                    message,
                    data: payload.to_value(),
                }
            }
            ProductError::BadRequest { message, payload } => {
                tracing::info!(status = status.as_u16(), "Bad request: {}", message);
                ErrorBody {
                    message,
                    data: payload.to_value(),
                }
            }
            ProductError::Database(cause) => {
                tracing::error!(status = status.as_u16(), "Database error: {}", cause);
                ErrorBody {
                    message: "Internal server error".to_string(),
                    data: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<sea_orm::DbErr> for ProductError {
    fn from(err: sea_orm::DbErr) -> Self {
        ProductError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_bad_request_keeps_not_found() {
        let err = ProductError::product_not_found(7).into_bad_request();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Could not find product with id 7.");
    }

    #[test]
    fn test_into_bad_request_wraps_database_errors() {
        let err = ProductError::Database("FOREIGN KEY constraint failed".to_string())
            .into_bad_request();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "FOREIGN KEY constraint failed");
    }

    #[test]
    fn test_payload_rendering() {
        assert_eq!(Payload::Omitted.to_value(), None);
        assert_eq!(Payload::EmptyList.to_value(), Some(json!([])));
        assert_eq!(Payload::EmptyObject.to_value(), Some(json!({})));
    }

    #[test]
    fn test_with_payload_ignores_database_errors() {
        let err = ProductError::Database("boom".to_string()).with_payload(Payload::EmptyList);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
