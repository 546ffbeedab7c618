// crates/server/src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use pitchside_core::ValidationError;
use pitchside_db::DbError;

/// Structured JSON error response for API errors
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// API error types that map to HTTP status codes
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// The session write and the player-history append diverged. One
    /// side is committed and stays committed; the caller retries the
    /// whole submission.
    #[error("Partial write: {completed} committed but {failed} failed: {source}")]
    PartialWrite {
        completed: &'static str,
        failed: &'static str,
        #[source]
        source: DbError,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            ApiError::SessionNotFound(id) => {
                tracing::warn!(session_id = %id, "Session not found");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details("Session not found", format!("Session ID: {}", id)),
                )
            }
            ApiError::PlayerNotFound(id) => {
                tracing::warn!(player_id = %id, "Player not found");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details("Player not found", format!("Player ID: {}", id)),
                )
            }
            ApiError::Validation(err) => {
                tracing::warn!(error = %err, "Validation rejected request");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_details("Validation error", err.to_string()),
                )
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(message = %msg, "Bad request");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_details("Bad request", msg.clone()),
                )
            }
            ApiError::Database(db_err) => {
                tracing::error!(error = %db_err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details("Database error", db_err.to_string()),
                )
            }
            ApiError::PartialWrite {
                completed,
                failed,
                source,
            } => {
                tracing::error!(
                    completed = %completed,
                    failed = %failed,
                    error = %source,
                    "Partial write: documents diverged, retry the submission"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details(
                        "Partial write",
                        format!("{completed} committed but {failed} failed; retry the submission"),
                    ),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
