//! Error handling for the Safai report service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error (missing required user input)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid draft state transition
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Capture requested while no stream is open
    #[error("Capture source not active")]
    NotActive,

    /// Geolocation could not be resolved (recoverable, callers continue without a fix)
    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    /// Config error (operator-correctable, checked at startup)
    #[error("Config error: {0}")]
    Config(String),

    /// Image host rejected or failed an upload; aborts the remainder of the batch
    #[error("Upload failed for draft {draft_id}: {message}")]
    Upload { draft_id: Uuid, message: String },

    /// Report store error
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            Error::InvalidTransition(msg) => {
                (StatusCode::CONFLICT, "INVALID_TRANSITION", msg.clone())
            }
            Error::NotActive => (
                StatusCode::CONFLICT,
                "NOT_ACTIVE",
                "Capture source not active".to_string(),
            ),
            Error::LocationUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "LOCATION_UNAVAILABLE",
                msg.clone(),
            ),
            Error::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", msg.clone()),
            Error::Upload { draft_id, message } => (
                StatusCode::BAD_GATEWAY,
                "UPLOAD_FAILED",
                format!("Draft {}: {}", draft_id, message),
            ),
            Error::Persistence(msg) => {
                (StatusCode::BAD_GATEWAY, "PERSISTENCE_ERROR", msg.clone())
            }
            Error::Serialization(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SERIALIZATION_ERROR",
                e.to_string(),
            ),
            Error::Http(e) => (StatusCode::BAD_GATEWAY, "HTTP_ERROR", e.to_string()),
            Error::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR", e.to_string()),
            Error::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
        };

        tracing::error!(
            status = %status,
            error_code = %error_code,
            message = %message,
            "Request error"
        );

        let body = Json(json!({
            "error_code": error_code,
            "message": message
        }));

        (status, body).into_response()
    }
}
