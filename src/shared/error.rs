//! Shared Error Types
//!
//! Error types for the platform-neutral part of the crate: identifier
//! validation, chat envelope decoding and sender stamping.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON serialization/deserialization failures
//! - `ValidationError` - Data validation failures (empty group id, blank content)
//! - `EnvelopeError` - A payload that is not a chat envelope at all
//!
//! # Usage
//!
//! ```rust
//! use studyhub::shared::error::SharedError;
//!
//! let error = SharedError::validation("content", "message content cannot be empty");
//! assert!(error.to_string().contains("content"));
//! ```
use thiserror::Error;

/// Shared error types
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// The payload is not shaped like a chat envelope
    #[error("Envelope error: {message}")]
    EnvelopeError {
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new envelope error
    pub fn envelope(message: impl Into<String>) -> Self {
        Self::EnvelopeError {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
