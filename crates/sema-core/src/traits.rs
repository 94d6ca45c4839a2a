//! Capability traits consumed by the pipelines.
//!
//! The pipelines are wired against these interfaces rather than concrete
//! backends, so storage and search engines can be swapped (or replaced
//! with in-memory fakes in tests) without touching orchestration code.

use async_trait::async_trait;

use crate::error::{EmbedError, IndexError, StorageError};
use crate::types::{BlobLocation, IndexEntry, IndexHit};

/// Durable key-to-bytes storage for original file bytes.
///
/// Policy: `put` on an existing key overwrites deterministically; there is
/// no silent duplication. Key construction is owned by the caller.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under the given key, overwriting any previous object.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<BlobLocation, StorageError>;

    /// Fetch the bytes stored at a location.
    async fn get(&self, location: &BlobLocation) -> Result<Vec<u8>, StorageError>;

    /// Reachability probe for health reporting. Never mutates state.
    async fn is_available(&self) -> bool;
}

/// Text to fixed-dimension vector conversion.
///
/// Deterministic for a fixed model and input: ingestion retries and
/// repeated queries must produce identical vectors.
#[async_trait]
pub trait EmbeddingGenerator: Send + Sync {
    /// Identifier of the active model. Documents embedded under different
    /// model ids are not comparable; the index records this at creation.
    fn model_id(&self) -> &str;

    /// Output dimension, identical for every call.
    fn dimension(&self) -> usize;

    /// Embed a single text. Fails on empty input; over-length text is the
    /// caller's concern (see the document embedder's chunk-and-pool policy).
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Embed several texts, preserving input order exactly.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Reachability probe for health reporting.
    async fn is_available(&self) -> bool;
}

/// Similarity search over stored vectors.
///
/// The metric is cosine similarity for the whole corpus. Ordering is
/// strictly descending by score with a deterministic tie-break: earliest
/// `created_at` first, then id ascending, so identical queries against a
/// static corpus always return identical orderings.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or overwrite the entry for `entry.id`. Visible to every
    /// query issued after this call returns.
    async fn upsert(&self, entry: IndexEntry) -> Result<(), IndexError>;

    /// Return up to `top_k` nearest entries. `top_k == 0` is rejected;
    /// `top_k` greater than the corpus size returns every entry.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexHit>, IndexError>;

    /// Number of entries currently indexed.
    async fn len(&self) -> Result<usize, IndexError>;

    /// Reachability probe for health reporting.
    async fn is_available(&self) -> bool;
}
