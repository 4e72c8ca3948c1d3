//! API error types with HTTP response mapping.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use meow_store::StoreError;
use query::{Envelope, Status};
use search_index::IndexError;
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request from the client.
    #[error("{0}")]
    BadRequest(String),
    /// Internal server error. The message is safe to show to callers.
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Turns a gateway envelope into a handler result.
pub fn respond<T>(envelope: Envelope<T>) -> Result<Json<T>, ApiError> {
    match envelope {
        Envelope::Ok(body) => Ok(Json(body)),
        Envelope::Error {
            status: Status::BadRequest,
            message,
        } => Err(ApiError::BadRequest(message)),
        Envelope::Error {
            status: Status::Internal,
            message,
        } => Err(ApiError::Internal(message)),
    }
}

/// Failures while connecting to backends at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("System of record setup failed: {0}")]
    Store(#[from] StoreError),

    #[error("Search index setup failed: {0}")]
    Index(#[from] IndexError),
}
