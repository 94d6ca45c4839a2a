//! Core domain types for sema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Unique identifier for documents: lowercase hex sha-256 of the raw file bytes.
pub type DocumentId = String;

/// Metadata attached to a document: string keys mapped to scalar/string values.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Compute the content-addressed id for a file's raw bytes.
///
/// Identical bytes always produce the same id, which makes re-uploads
/// idempotent: downstream blob and index writes become overwrites.
pub fn content_id(bytes: &[u8]) -> DocumentId {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Upper clamp on `top_k` to bound the work a single query can demand.
pub const MAX_TOP_K: usize = 100;

/// A document in the corpus.
///
/// Created exactly once by the ingestion pipeline and never mutated
/// afterward; the corpus is append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub filename: String,
    /// Extracted UTF-8 text. Empty only when extraction legitimately
    /// yielded no text, in which case the document is flagged unsearchable.
    pub content: String,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    /// Document-level embedding, fixed dimension for the whole corpus.
    /// `None` when the document was flagged unsearchable at ingestion
    /// (empty content), and on documents hydrated from query results,
    /// which do not carry their vector back out of the index.
    pub embedding: Option<Vec<f32>>,
}

/// A semantic search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Query text; must be non-empty after trimming.
    pub query: String,
    /// Number of results requested; must be > 0. Values above
    /// [`MAX_TOP_K`] are clamped, not rejected.
    pub top_k: usize,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, top_k: usize) -> Self {
        Self {
            query: query.into(),
            top_k,
        }
    }
}

/// A single ranked search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Fully hydrated document (content restored from the index payload).
    pub document: Document,
    /// Cosine similarity against the query vector. Comparable only across
    /// results of the same query.
    pub score: f32,
    /// 1-based position after the deterministic sort.
    pub rank: usize,
}

/// Response for a search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    /// Sorted by ascending rank.
    pub results: Vec<QueryResult>,
    pub total_results: usize,
}

/// Where a stored blob lives, as returned by the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobLocation(pub String);

impl std::fmt::Display for BlobLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payload stored alongside each vector in the index.
///
/// Carries everything needed to hydrate a full `Document` on query, so
/// retrieval never has to touch the blob store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexPayload {
    pub filename: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub metadata: Metadata,
}

/// A complete index entry: id, vector and payload.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub id: DocumentId,
    pub vector: Vec<f32>,
    pub payload: IndexPayload,
}

/// A single hit returned by a vector index query, ordered by score.
#[derive(Debug, Clone)]
pub struct IndexHit {
    pub id: DocumentId,
    pub score: f32,
    pub payload: IndexPayload,
}

/// The stage of the ingestion pipeline a failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Extension not in the supported set. Client error, never retried.
    Validation,
    /// Bytes did not parse as the declared format.
    Extraction,
    /// Blob store write failed.
    Storage,
    /// Embedding generation failed.
    Embedding,
    /// Vector index upsert failed.
    Index,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Validation => "validation",
            FailureKind::Extraction => "extraction",
            FailureKind::Storage => "storage",
            FailureKind::Embedding => "embedding",
            FailureKind::Index => "index",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Failure diagnostic for one file in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    pub filename: String,
    pub kind: FailureKind,
    pub message: String,
    /// Set when the blob write succeeded before a later stage failed,
    /// leaving an orphaned object that an operator may want to reap.
    pub orphaned_blob: Option<BlobLocation>,
}

impl std::fmt::Display for FileFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} error: {}", self.filename, self.kind, self.message)?;
        if let Some(ref loc) = self.orphaned_blob {
            write!(f, " (orphaned blob at {})", loc)?;
        }
        Ok(())
    }
}

/// Per-file result of an ingestion batch. One file's failure never
/// affects its siblings.
#[derive(Debug, Clone)]
pub enum FileOutcome {
    Created(Document),
    Failed(FileFailure),
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Created(_))
    }

    pub fn document(&self) -> Option<&Document> {
        match self {
            FileOutcome::Created(doc) => Some(doc),
            FileOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FileFailure> {
        match self {
            FileOutcome::Created(_) => None,
            FileOutcome::Failed(failure) => Some(failure),
        }
    }
}

/// Reachability of a single external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentHealth {
    Up,
    Down,
}

impl ComponentHealth {
    pub fn from_available(available: bool) -> Self {
        if available {
            ComponentHealth::Up
        } else {
            ComponentHealth::Down
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, ComponentHealth::Up)
    }
}

/// Composite health of the pipeline's collaborators. Probing never
/// mutates state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub blob_store: ComponentHealth,
    pub vector_index: ComponentHealth,
    pub embedder: ComponentHealth,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.blob_store.is_up() && self.vector_index.is_up() && self.embedder.is_up()
    }
}
