//! Error types shared across the capability traits.

use thiserror::Error;

/// Errors from blob storage backends.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Blob store unavailable: {0}")]
    Unavailable(String),

    #[error("Blob not found: {location}")]
    NotFound { location: String },

    #[error("Storage error: {0}")]
    Other(String),
}

impl StorageError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Unavailable(_))
    }
}

/// Errors from embedding generation.
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("Cannot embed empty input")]
    EmptyInput,

    #[error("Embedding request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Embedding model not found: {model}")]
    ModelNotFound { model: String },

    #[error("Embedding API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding backend error: {0}")]
    Backend(String),
}

impl EmbedError {
    /// Transient failures are worth retrying with backoff; everything
    /// else is surfaced immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            EmbedError::Timeout { .. } | EmbedError::Connection(_) => true,
            EmbedError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Errors from vector index backends.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Invalid top_k: {top_k} (must be greater than zero)")]
    InvalidTopK { top_k: usize },

    #[error("Vector dimension mismatch: index holds {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Model mismatch: index was built with '{index_model}', generator is '{generator_model}' (re-index required)")]
    ModelMismatch {
        index_model: String,
        generator_model: String,
    },

    #[error("Vector index unavailable: {0}")]
    Unavailable(String),

    #[error("Index backend error: {0}")]
    Backend(String),
}

impl IndexError {
    pub fn is_transient(&self) -> bool {
        matches!(self, IndexError::Unavailable(_))
    }
}
