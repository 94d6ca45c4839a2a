//! Sema Embed - Text to fixed-dimension vectors.
//!
//! Provides the HTTP embedding client (Ollama-compatible API), the
//! deterministic offline hashing embedder, and the document-level wrapper
//! that chunks over-length text and pools window vectors into a single
//! document vector.

mod chunker;
mod client;
mod document;
mod hash;
mod types;

pub use chunker::{ChunkConfig, Chunker};
pub use client::HttpEmbedder;
pub use document::DocumentEmbedder;
pub use hash::HashEmbedder;
pub use types::{EmbeddingRequest, EmbeddingResponse, ListModelsResponse, ModelInfo};

use sema_config::EmbeddingConfig;
use sema_core::EmbeddingGenerator;
use std::sync::Arc;

/// Build the configured embedding generator: the HTTP backend, or the
/// offline hashing embedder when `offline` is set, either way wrapped
/// with the chunk-and-pool policy for long documents.
pub fn build_embedder(
    config: &EmbeddingConfig,
) -> Result<Arc<dyn EmbeddingGenerator>, sema_core::EmbedError> {
    let chunking = ChunkConfig::from_embedding_config(config);

    let inner: Arc<dyn EmbeddingGenerator> = if config.offline {
        Arc::new(HashEmbedder::new(config.dimension))
    } else {
        Arc::new(HttpEmbedder::from_config(config)?)
    };

    Ok(Arc::new(DocumentEmbedder::new(inner, chunking)))
}
