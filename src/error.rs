//! Error types for the text-matching service

use thiserror::Error;

/// Result type alias for text-matching operations
pub type Result<T> = std::result::Result<T, MatchError>;

/// Error types that can occur in text-matching operations
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("text must not be empty")]
    EmptyText,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid vector: {reason}")]
    InvalidVector { reason: String },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Snapshot inconsistent: {vectors} vectors but {texts} texts")]
    SnapshotInconsistent { vectors: usize, texts: usize },
}
