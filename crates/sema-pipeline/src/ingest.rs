//! Ingestion pipeline: extract, store, embed, index.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use sema_config::PipelineConfig;
use sema_core::{
    content_id, BlobStore, Document, EmbeddingGenerator, FailureKind, FileFailure, FileOutcome,
    IndexEntry, IndexPayload, Metadata, VectorIndex,
};
use sema_extract::{extract, ExtractError, Format};

use crate::retry::with_retry;

/// One file submitted for ingestion.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// Drives a file through extraction, blob storage, embedding and
/// indexing, producing an immutable [`Document`].
///
/// Stages are not transactionally coupled: a blob written before a later
/// stage fails is reported as an orphan in the failure diagnostic, never
/// silently discarded.
pub struct IngestionPipeline {
    blob_store: Arc<dyn BlobStore>,
    embedder: Arc<dyn EmbeddingGenerator>,
    index: Arc<dyn VectorIndex>,
    config: PipelineConfig,
}

impl IngestionPipeline {
    pub fn new(
        blob_store: Arc<dyn BlobStore>,
        embedder: Arc<dyn EmbeddingGenerator>,
        index: Arc<dyn VectorIndex>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            blob_store,
            embedder,
            index,
            config,
        }
    }

    fn backoff(&self) -> Duration {
        Duration::from_millis(self.config.retry_backoff_ms)
    }

    /// Ingest a single file. Failures are reported per file, attributed
    /// to the stage that caused them.
    pub async fn ingest_file(&self, filename: &str, bytes: &[u8]) -> FileOutcome {
        match self.ingest_inner(filename, bytes).await {
            Ok(document) => {
                info!("Ingested {} as {}", filename, document.id);
                FileOutcome::Created(document)
            }
            Err(failure) => {
                warn!("Failed to ingest {}", failure);
                FileOutcome::Failed(failure)
            }
        }
    }

    /// Ingest a batch. Every file gets an independent outcome in input
    /// order; per-file work runs concurrently up to the configured limit
    /// so inference resources are not exhausted.
    pub async fn ingest_batch(&self, files: Vec<FileUpload>) -> Vec<FileOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent));

        let tasks = files.into_iter().map(|file| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .expect("ingestion semaphore closed");
                self.ingest_file(&file.filename, &file.bytes).await
            }
        });

        futures_util::future::join_all(tasks).await
    }

    async fn ingest_inner(&self, filename: &str, bytes: &[u8]) -> Result<Document, FileFailure> {
        let fail = |kind: FailureKind, message: String| FileFailure {
            filename: filename.to_string(),
            kind,
            message,
            orphaned_blob: None,
        };

        // Client errors first: no side effects for unsupported or
        // malformed files.
        let format = Format::from_filename(filename)
            .map_err(|e| fail(FailureKind::Validation, e.to_string()))?;

        let extraction = extract(bytes, format).map_err(|e| match e {
            ExtractError::UnsupportedFormat { .. } => fail(FailureKind::Validation, e.to_string()),
            ExtractError::Malformed { .. } => fail(FailureKind::Extraction, e.to_string()),
        })?;

        let id = content_id(bytes);
        let key = format!("documents/{}/{}", id, filename);
        debug!("Storing {} under {}", filename, key);

        let location = with_retry(
            self.config.retry_attempts,
            self.backoff(),
            |e: &sema_core::StorageError| e.is_transient(),
            "blob write",
            || self.blob_store.put(&key, bytes),
        )
        .await
        .map_err(|e| fail(FailureKind::Storage, e.to_string()))?;

        let created_at = Utc::now();
        let mut metadata = Metadata::new();
        metadata.insert(
            "content_type".to_string(),
            serde_json::json!(format.mime_type()),
        );
        metadata.insert("size".to_string(), serde_json::json!(bytes.len()));
        metadata.extend(extraction.metadata);

        // Legitimately empty extraction: flag the document as
        // unsearchable instead of indexing an all-equal vector.
        if extraction.text.trim().is_empty() {
            warn!("{} extracted no text; flagged as unsearchable", filename);
            metadata.insert("searchable".to_string(), serde_json::json!(false));
            return Ok(Document {
                id,
                filename: filename.to_string(),
                content: extraction.text,
                metadata,
                created_at,
                embedding: None,
            });
        }

        let vector = with_retry(
            self.config.retry_attempts,
            self.backoff(),
            |e: &sema_core::EmbedError| e.is_transient(),
            "embedding",
            || self.embedder.embed(&extraction.text),
        )
        .await
        .map_err(|e| FileFailure {
            filename: filename.to_string(),
            kind: FailureKind::Embedding,
            message: e.to_string(),
            orphaned_blob: Some(location.clone()),
        })?;

        let entry = IndexEntry {
            id: id.clone(),
            vector: vector.clone(),
            payload: IndexPayload {
                filename: filename.to_string(),
                content: extraction.text.clone(),
                created_at,
                metadata: metadata.clone(),
            },
        };

        with_retry(
            self.config.retry_attempts,
            self.backoff(),
            |e: &sema_core::IndexError| e.is_transient(),
            "index upsert",
            || self.index.upsert(entry.clone()),
        )
        .await
        .map_err(|e| FileFailure {
            filename: filename.to_string(),
            kind: FailureKind::Index,
            message: e.to_string(),
            orphaned_blob: Some(location.clone()),
        })?;

        Ok(Document {
            id,
            filename: filename.to_string(),
            content: extraction.text,
            metadata,
            created_at,
            embedding: Some(vector),
        })
    }
}
