//! API error taxonomy and its mapping onto HTTP responses.
//!
//! Every error renders as `{"message": "..."}` with the matching status.
//! `NotFound` covers both "does not exist" and "owned by someone else" —
//! callers must not be able to tell the difference.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use db::DbError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Map a repository error, naming the missing resource. The repository's
    /// `VehicleNotFound` is distinguished so handlers can report which
    /// lookup failed ("Vehicle not found." vs "Service record not found.").
    pub fn from_db(err: DbError, not_found: &str, vehicle_not_found: &str) -> Self {
        match err {
            DbError::NotFound => Self::NotFound(not_found.to_string()),
            DbError::VehicleNotFound => Self::NotFound(vehicle_not_found.to_string()),
            DbError::DuplicateEmail => Self::Conflict("That email is already in use.".to_string()),
            DbError::Sqlx(err) => Self::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(message) => (StatusCode::BAD_REQUEST, message),
            Self::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::Conflict(message) => (StatusCode::CONFLICT, message),
            Self::Internal(detail) => {
                error!("internal error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error.".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
