//! Mapping of store errors onto HTTP statuses and the response envelope.
//!
//! Client-caused errors return their message. Internal errors are logged in
//! full and answered with a generic message.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

use super::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request (bad JSON, query string or path, missing ids).
    #[error("{0}")]
    BadRequest(String),

    /// Propagated from a store operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ApiError::Store(err) => match err {
                StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
                StoreError::Validation(_) | StoreError::InvalidCursor(_) => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                StoreError::Conflict { .. } => (StatusCode::CONFLICT, err.to_string()),
                StoreError::Backend(kv) if kv.is_timeout() => {
                    error!(error = %err, "storage timeout");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "storage backend timed out".to_owned(),
                    )
                }
                StoreError::BulkDelete { failures, .. } => {
                    for (id, cause) in failures {
                        error!(%id, error = %cause, "bulk delete failure");
                    }
                    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
                }
                StoreError::Backend(_) | StoreError::Serde { .. } | StoreError::Lock(_) => {
                    error!(error = %err, "internal store error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_owned(),
                    )
                }
            },
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}
