use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Session is fully booked: {0}")]
    SessionFull(String),
    #[error("User {user_id} already holds a confirmed booking for session {session_id}")]
    DuplicateBooking { user_id: String, session_id: String },
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    #[error("Session is not open for booking: {0}")]
    SessionNotActive(String),
    #[error("Booking not found: {0}")]
    BookingNotFound(String),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
}

impl AppError {
    /// Transient failures may succeed when retried by the caller. Everything else is permanent
    /// for the given input.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::StorageUnavailable(_))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        error!("Database error: {:?}", e);
        AppError::StorageUnavailable(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::SessionFull(_) | AppError::DuplicateBooking { .. } | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::SessionNotFound(_) | AppError::BookingNotFound(_) | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::SessionNotActive(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
        };

        let message = match &self {
            AppError::StorageUnavailable(_) => "Storage temporarily unavailable".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
