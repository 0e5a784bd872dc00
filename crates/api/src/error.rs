//! API error payloads.
//!
//! Every handler converts domain errors here at the operation boundary;
//! clients receive a JSON body with an `error` field (plus `detail` for
//! server-side failures) and the matching transport status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chapa_proxy::ChapaError;
use database::DatabaseError;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid credentials")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DatabaseError::AlreadyExists { .. }
            | DatabaseError::InvalidTransition { .. }
            | DatabaseError::PaymentNotConfirmed { .. } => ApiError::Validation(err.to_string()),
            DatabaseError::NotAssignedGuide { .. } => ApiError::Forbidden(err.to_string()),
            DatabaseError::Sqlx(_) | DatabaseError::Migration(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<ChapaError> for ApiError {
    fn from(err: ChapaError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": msg }),
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "error": "Invalid credentials" }),
            ),
            ApiError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                serde_json::json!({ "error": msg }),
            ),
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": msg }),
            ),
            ApiError::Internal(detail) => {
                warn!(error = %detail, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": "An error occurred", "detail": detail }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
