//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
///
/// None of these escape [`crate::Pipeline::validate`]; they surface from the
/// storage backends and cache persistence for callers that drive those
/// directly.
#[derive(Debug, Error)]
pub enum Error {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage backend rejected the operation.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
