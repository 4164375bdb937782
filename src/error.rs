//! Error types for the Knack client

use thiserror::Error;

/// Knack client error
#[derive(Debug, Error)]
pub enum KnackError {
    /// HTTP transport failed before a response was received
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a status other than 200
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Response body was not the JSON shape we expected
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Object name has no entry in the object directory
    #[error("Unknown object: {0}")]
    UnknownObject(String),

    /// Field label has no entry in the object's field directory
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Update payload was rejected before any request was made
    #[error("Invalid payload: {0}")]
    Payload(String),
}

impl KnackError {
    /// Status code of a `Server` error, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            KnackError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for Knack operations
pub type Result<T> = std::result::Result<T, KnackError>;
