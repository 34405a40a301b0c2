use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Database(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        if status.is_server_error() {
            tracing::error!("Error: {}: {}", status, message);
        } else {
            tracing::debug!("Request rejected: {}: {}", status, message);
        }

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Failure kinds of the scheduling core, shared by every cell.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulingError {
    /// Missing or invalid input, or a service/professional mismatch.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The interval was taken between availability query and commit.
    #[error("Requested time slot is no longer available")]
    SlotUnavailable,

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage or transport failure, surfaced as-is. No retry happens in the core.
    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl SchedulingError {
    pub fn validation(message: impl Into<String>) -> Self {
        SchedulingError::ValidationError(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        SchedulingError::NotFound(message.into())
    }

    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        SchedulingError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl From<SchedulingError> for AppError {
    fn from(error: SchedulingError) -> Self {
        match error {
            SchedulingError::ValidationError(msg) => AppError::ValidationError(msg),
            SchedulingError::SlotUnavailable => AppError::Conflict(error.to_string()),
            SchedulingError::InvalidTransition { .. } => AppError::BadRequest(error.to_string()),
            SchedulingError::NotFound(msg) => AppError::NotFound(msg),
            SchedulingError::OperationFailed(msg) => AppError::Database(msg),
        }
    }
}
