//! Composite health probing of the pipeline's collaborators.

use std::sync::Arc;

use sema_core::{BlobStore, ComponentHealth, EmbeddingGenerator, HealthReport, VectorIndex};

/// Probes blob store, vector index and embedder reachability without
/// mutating any state.
pub struct HealthCheck {
    blob_store: Arc<dyn BlobStore>,
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingGenerator>,
}

impl HealthCheck {
    pub fn new(
        blob_store: Arc<dyn BlobStore>,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingGenerator>,
    ) -> Self {
        Self {
            blob_store,
            index,
            embedder,
        }
    }

    pub async fn check(&self) -> HealthReport {
        let (blob_store, vector_index, embedder) = tokio::join!(
            self.blob_store.is_available(),
            self.index.is_available(),
            self.embedder.is_available(),
        );

        HealthReport {
            blob_store: ComponentHealth::from_available(blob_store),
            vector_index: ComponentHealth::from_available(vector_index),
            embedder: ComponentHealth::from_available(embedder),
        }
    }
}
