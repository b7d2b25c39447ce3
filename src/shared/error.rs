//! Shared Error Types
//!
//! Errors raised while building the values that cross the boundary between
//! the UI collaborator and the offline core. Decoding failures belong to
//! the layer that decodes (`FetchError::InvalidBody`, axum's `Json`
//! rejection), so the only shared failure is an invalid field.
//!
//! # Usage
//!
//! ```rust
//! use ecotravel::shared::error::SharedError;
//!
//! let error = SharedError::validation("description", "Description cannot be empty");
//! ```
use thiserror::Error;

/// Shared error types for activity entries
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}
