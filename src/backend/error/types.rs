/**
 * Backend Error Types
 *
 * Errors surfaced by HTTP handlers (the websocket handshake, history and
 * health routes). Errors inside a live connection never reach this type:
 * they end that connection and are logged by the pumps.
 *
 * # Error Categories
 *
 * - `HandlerError` - Bad input to a handler, with an explicit status
 * - `Unauthorized` - Credential missing or rejected (401)
 * - `HubUnavailable` - The coordinator has stopped (503)
 * - `PersistenceError` - The message store failed (500)
 * - `SharedError` - Validation/envelope errors from the shared module
 * - `SerializationError` - JSON serialization failures
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::auth::AuthError;
use crate::backend::hub::HubError;
use crate::backend::persistence::PersistenceError;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use studyhub::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::BAD_REQUEST, "Invalid request");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., invalid path or query)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Authentication failure
    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    /// The hub coordinator is not accepting events
    #[error("Hub unavailable: {0}")]
    HubUnavailable(#[from] HubError),

    /// Message store failure
    #[error("Persistence error: {0}")]
    PersistenceError(#[from] PersistenceError),

    /// Shared error (from shared module)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `Unauthorized` - 401 Unauthorized
    /// - `HubUnavailable` - 503 Service Unavailable
    /// - `PersistenceError` - 500 Internal Server Error
    /// - `SharedError` - 400 for validation/envelope errors, 500 for serialization
    /// - `SerializationError` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::HubUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::PersistenceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::EnvelopeError { .. } => StatusCode::BAD_REQUEST,
            },
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to a client
    ///
    /// Authentication and storage details stay in the logs.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::Unauthorized(_) => "invalid or missing credentials".to_string(),
            Self::HubUnavailable(_) => "chat service unavailable".to_string(),
            Self::PersistenceError(_) => "message store unavailable".to_string(),
            Self::SharedError(err) => err.to_string(),
            Self::SerializationError(err) => err.to_string(),
        }
    }
}
