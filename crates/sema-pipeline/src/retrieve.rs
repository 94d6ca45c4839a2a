//! Retrieval pipeline: embed the query, search the index, hydrate results.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use sema_config::PipelineConfig;
use sema_core::{
    Document, EmbeddingGenerator, IndexHit, QueryResult, SearchQuery, SearchResponse, VectorIndex,
    MAX_TOP_K,
};

use crate::error::QueryError;
use crate::retry::with_retry;

/// Answers search queries against the indexed corpus.
///
/// Uses the same embedding generator instance as ingestion; the index
/// backend pins the model id and dimension at creation, so a stale-model
/// query fails loudly instead of silently comparing incompatible vectors.
pub struct RetrievalPipeline {
    embedder: Arc<dyn EmbeddingGenerator>,
    index: Arc<dyn VectorIndex>,
    config: PipelineConfig,
}

impl RetrievalPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingGenerator>,
        index: Arc<dyn VectorIndex>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            config,
        }
    }

    /// Execute a semantic search. An empty index yields an empty result
    /// list, not an error; there is no minimum-score filter.
    pub async fn search(&self, query: SearchQuery) -> Result<SearchResponse, QueryError> {
        if query.query.trim().is_empty() {
            return Err(QueryError::InvalidQuery);
        }
        if query.top_k == 0 {
            return Err(QueryError::InvalidTopK {
                top_k: query.top_k,
            });
        }
        let top_k = query.top_k.min(MAX_TOP_K);

        info!("Processing query: '{}' (top_k={})", query.query, top_k);
        let backoff = Duration::from_millis(self.config.retry_backoff_ms);

        let vector = with_retry(
            self.config.retry_attempts,
            backoff,
            |e: &sema_core::EmbedError| e.is_transient(),
            "query embedding",
            || self.embedder.embed(&query.query),
        )
        .await?;

        let hits = with_retry(
            self.config.retry_attempts,
            backoff,
            |e: &sema_core::IndexError| e.is_transient(),
            "index query",
            || self.index.query(&vector, top_k),
        )
        .await?;

        debug!("Index returned {} hit(s)", hits.len());

        let results: Vec<QueryResult> = hits
            .into_iter()
            .enumerate()
            .map(|(position, hit)| hydrate(hit, position + 1))
            .collect();

        Ok(SearchResponse {
            query: query.query,
            total_results: results.len(),
            results,
        })
    }
}

/// Rebuild a full document from the index payload. Vectors stay in the
/// index; hydrated documents carry content and metadata only.
fn hydrate(hit: IndexHit, rank: usize) -> QueryResult {
    QueryResult {
        document: Document {
            id: hit.id,
            filename: hit.payload.filename,
            content: hit.payload.content,
            metadata: hit.payload.metadata,
            created_at: hit.payload.created_at,
            embedding: None,
        },
        score: hit.score,
        rank,
    }
}
