//! Error types for the retrieval pipeline.

use sema_core::{EmbedError, IndexError};
use thiserror::Error;

/// Errors surfaced by a search request. Client-input errors
/// (`InvalidQuery`, `InvalidTopK`) are rejected before any side effects;
/// backend errors have already exhausted their retry budget.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Invalid query: query text must not be empty")]
    InvalidQuery,

    #[error("Invalid top_k: {top_k} (must be greater than zero)")]
    InvalidTopK { top_k: usize },

    #[error("Query embedding failed: {0}")]
    Embedding(#[from] EmbedError),

    #[error("Index query failed: {0}")]
    Index(#[from] IndexError),
}
