//! Error types for breed types.

use thiserror::Error;

/// Errors that can occur while decoding or validating breed data.
#[derive(Debug, Error)]
pub enum BreedError {
    /// JSON deserialization failed
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// Invalid data format
    #[error("invalid data: {0}")]
    InvalidData(String),
}
