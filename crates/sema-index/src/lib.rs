//! Sema Index - Shipped backends for the storage capability traits.
//!
//! Blob stores: filesystem ([`FsBlobStore`]) and in-memory
//! ([`MemoryBlobStore`]). Vector indexes: SQLite ([`SqliteVectorIndex`])
//! and in-memory ([`MemoryVectorIndex`]). The in-memory pair exists for
//! tests and ephemeral runs; the pipelines only ever see the traits.

mod blob_fs;
mod memory;
mod similarity;
mod sqlite;

pub use blob_fs::FsBlobStore;
pub use memory::{MemoryBlobStore, MemoryVectorIndex};
pub use similarity::cosine_similarity;
pub use sqlite::SqliteVectorIndex;
