//! Sema Core - Domain types and capability traits for the sema retrieval pipeline.

mod error;
mod traits;
mod types;

pub use error::{EmbedError, IndexError, StorageError};
pub use traits::{BlobStore, EmbeddingGenerator, VectorIndex};
pub use types::*;
