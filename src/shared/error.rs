//! Shared Error Types
//!
//! Errors that describe bad input or bad payloads, independent of whether
//! they were detected before a request was sent or while reading a response.
//!
//! # Error Categories
//!
//! - `SerializationError` - a payload or file that could not be decoded
//! - `ValidationError` - a form field that cannot be submitted as-is
//!
//! # Usage
//!
//! ```rust
//! use projet_client::shared::error::SharedError;
//!
//! let error = SharedError::validation("email", "Please enter a valid email address");
//! assert_eq!(error.field(), Some("email"));
//! ```
use thiserror::Error;

/// Input and payload errors shared by every layer of the client
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// A payload or configuration file could not be decoded
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// A form field failed validation
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Message suitable for showing to the user
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

    /// Field name for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ValidationError { field, .. } => Some(field),
            Self::SerializationError { .. } => None,
        }
    }

    /// The bare message, without the category prefix used by `Display`
    pub fn user_message(&self) -> &str {
        match self {
            Self::ValidationError { message, .. } | Self::SerializationError { message } => message,
        }
    }
}

impl From<toml::de::Error> for SharedError {
    fn from(err: toml::de::Error) -> Self {
        Self::serialization(format!("TOML error: {}", err))
    }
}
