//! Document-level embedding: chunk over-length text and pool the
//! window vectors into a single vector.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use sema_core::{EmbedError, EmbeddingGenerator};

use crate::chunker::{ChunkConfig, Chunker};

/// Wraps a base generator with the chunk-and-pool policy: text that
/// exceeds the window is split into overlapping windows, each window is
/// embedded, and the results are combined by length-weighted mean
/// pooling. The corpus is indexed at document granularity, so callers
/// always get exactly one vector per text.
pub struct DocumentEmbedder {
    inner: Arc<dyn EmbeddingGenerator>,
    chunker: Chunker,
}

impl DocumentEmbedder {
    pub fn new(inner: Arc<dyn EmbeddingGenerator>, config: ChunkConfig) -> Self {
        Self {
            inner,
            chunker: Chunker::new(config),
        }
    }
}

#[async_trait]
impl EmbeddingGenerator for DocumentEmbedder {
    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if text.trim().is_empty() {
            return Err(EmbedError::EmptyInput);
        }

        if self.chunker.fits(text) {
            return self.inner.embed(text).await;
        }

        let windows = self.chunker.split(text);
        debug!("Pooling {} window embedding(s)", windows.len());

        let vectors = self.inner.embed_batch(&windows).await?;
        let weights: Vec<f32> = windows.iter().map(|w| w.chars().count() as f32).collect();

        length_weighted_mean(&vectors, &weights, self.dimension())
    }

    async fn is_available(&self) -> bool {
        self.inner.is_available().await
    }
}

/// Combine window vectors into one, each weighted by its window length.
fn length_weighted_mean(
    vectors: &[Vec<f32>],
    weights: &[f32],
    dimension: usize,
) -> Result<Vec<f32>, EmbedError> {
    debug_assert_eq!(vectors.len(), weights.len());

    if vectors.is_empty() {
        return Err(EmbedError::EmptyInput);
    }

    let total: f32 = weights.iter().sum();
    let mut pooled = vec![0.0f32; dimension];

    for (vector, &weight) in vectors.iter().zip(weights) {
        if vector.len() != dimension {
            return Err(EmbedError::DimensionMismatch {
                expected: dimension,
                actual: vector.len(),
            });
        }
        for (acc, &value) in pooled.iter_mut().zip(vector) {
            *acc += value * weight / total;
        }
    }

    Ok(pooled)
}
