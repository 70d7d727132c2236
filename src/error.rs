//! Error types for Kinesic

use thiserror::Error;

/// Errors that can occur at the engine boundary.
///
/// The inference core itself never fails: empty buffers fall back to
/// zero-value features and unmatched rules fall back to carried-over labels.
/// Errors exist only where frames enter or leave the engine.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Failed to parse frame payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid frame: {0}")]
    InvalidFrame(#[from] crate::schema::ValidationError),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("State persistence error: {0}")]
    StateError(String),
}
