//! SQLite-backed vector index.
//!
//! Vectors live as little-endian f32 blobs next to their payload and are
//! scored with a brute-force cosine scan, which is plenty for corpora in
//! the tens of thousands of documents. The model id and dimension are
//! pinned in a meta table at creation: opening the same index with a
//! different model is an explicit error, never a silent mismatch.

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;
use tracing::info;

use async_trait::async_trait;
use sema_core::{IndexEntry, IndexError, IndexHit, IndexPayload, VectorIndex};

use crate::similarity::{cosine_similarity, rank_hits, vector_from_bytes, vector_to_bytes};

type ConnectionPool = Pool<SqliteConnectionManager>;
type PooledConn = PooledConnection<SqliteConnectionManager>;

const META_MODEL: &str = "embedding_model";
const META_DIMENSION: &str = "embedding_dimension";

/// Durable vector index over a single SQLite file.
#[derive(Clone, Debug)]
pub struct SqliteVectorIndex {
    pool: ConnectionPool,
    model_id: String,
    dimension: usize,
}

impl SqliteVectorIndex {
    /// Open (or create) an index at the given path for the given model.
    pub fn open<P: AsRef<Path>>(
        path: P,
        model_id: &str,
        dimension: usize,
    ) -> Result<Self, IndexError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| IndexError::Backend(e.to_string()))?;
        }

        info!("Opening vector index at: {}", path.display());

        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;",
            )?;
            Ok(())
        });

        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;

        Self::initialize(pool, model_id, dimension)
    }

    /// Open an in-memory index (for testing).
    pub fn open_in_memory(model_id: &str, dimension: usize) -> Result<Self, IndexError> {
        let manager = SqliteConnectionManager::memory();

        // Memory DB only supports a single connection
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;

        Self::initialize(pool, model_id, dimension)
    }

    fn initialize(
        pool: ConnectionPool,
        model_id: &str,
        dimension: usize,
    ) -> Result<Self, IndexError> {
        let index = Self {
            pool,
            model_id: model_id.to_string(),
            dimension,
        };

        let conn = index.conn()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS index_meta (
                 key TEXT PRIMARY KEY,
                 value TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS entries (
                 id TEXT PRIMARY KEY,
                 vector BLOB NOT NULL,
                 filename TEXT NOT NULL,
                 content TEXT NOT NULL,
                 created_at TEXT NOT NULL,
                 metadata TEXT NOT NULL
             );",
        )
        .map_err(backend)?;

        index.check_meta(&conn)?;
        Ok(index)
    }

    /// Pin the model id and dimension on first open; verify on later opens.
    fn check_meta(&self, conn: &PooledConn) -> Result<(), IndexError> {
        let stored_model = self.read_meta(conn, META_MODEL)?;
        let stored_dimension = self.read_meta(conn, META_DIMENSION)?;

        match (stored_model, stored_dimension) {
            (None, None) => {
                conn.execute(
                    "INSERT INTO index_meta (key, value) VALUES (?1, ?2), (?3, ?4)",
                    params![
                        META_MODEL,
                        self.model_id,
                        META_DIMENSION,
                        self.dimension.to_string()
                    ],
                )
                .map_err(backend)?;
                Ok(())
            }
            (Some(model), Some(dimension)) => {
                if model != self.model_id {
                    return Err(IndexError::ModelMismatch {
                        index_model: model,
                        generator_model: self.model_id.clone(),
                    });
                }
                let stored: usize = dimension
                    .parse()
                    .map_err(|_| IndexError::Backend("corrupt dimension meta".to_string()))?;
                if stored != self.dimension {
                    return Err(IndexError::DimensionMismatch {
                        expected: stored,
                        actual: self.dimension,
                    });
                }
                Ok(())
            }
            _ => Err(IndexError::Backend("incomplete index meta".to_string())),
        }
    }

    fn read_meta(&self, conn: &PooledConn, key: &str) -> Result<Option<String>, IndexError> {
        use rusqlite::OptionalExtension;
        conn.query_row(
            "SELECT value FROM index_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(backend)
    }

    fn conn(&self) -> Result<PooledConn, IndexError> {
        self.pool
            .get()
            .map_err(|e| IndexError::Unavailable(e.to_string()))
    }

    /// The model this index was created for.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    fn upsert_sync(&self, entry: IndexEntry) -> Result<(), IndexError> {
        if entry.vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: entry.vector.len(),
            });
        }

        let metadata = serde_json::to_string(&entry.payload.metadata)
            .map_err(|e| IndexError::Backend(e.to_string()))?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO entries (id, vector, filename, content, created_at, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                 vector = excluded.vector,
                 filename = excluded.filename,
                 content = excluded.content,
                 created_at = excluded.created_at,
                 metadata = excluded.metadata",
            params![
                entry.id,
                vector_to_bytes(&entry.vector),
                entry.payload.filename,
                entry.payload.content,
                entry.payload.created_at.to_rfc3339(),
                metadata,
            ],
        )
        .map_err(backend)?;

        Ok(())
    }

    fn query_sync(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexHit>, IndexError> {
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id, vector, filename, content, created_at, metadata FROM entries")
            .map_err(backend)?;

        let rows = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let vector_bytes: Vec<u8> = row.get(1)?;
                let filename: String = row.get(2)?;
                let content: String = row.get(3)?;
                let created_at: String = row.get(4)?;
                let metadata: String = row.get(5)?;
                Ok((id, vector_bytes, filename, content, created_at, metadata))
            })
            .map_err(backend)?;

        let mut candidates = Vec::new();
        for row in rows {
            let (id, vector_bytes, filename, content, created_at, metadata) =
                row.map_err(backend)?;

            let stored = vector_from_bytes(&vector_bytes, self.dimension);
            let created_at: DateTime<Utc> = created_at
                .parse::<DateTime<Utc>>()
                .map_err(|e| IndexError::Backend(format!("corrupt created_at: {}", e)))?;
            let metadata = serde_json::from_str(&metadata)
                .map_err(|e| IndexError::Backend(format!("corrupt metadata: {}", e)))?;

            candidates.push(IndexHit {
                score: cosine_similarity(vector, &stored),
                id,
                payload: IndexPayload {
                    filename,
                    content,
                    created_at,
                    metadata,
                },
            });
        }

        rank_hits(candidates, top_k)
    }

    fn len_sync(&self) -> Result<usize, IndexError> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))
            .map_err(backend)?;
        Ok(count as usize)
    }
}

fn backend(e: rusqlite::Error) -> IndexError {
    IndexError::Backend(e.to_string())
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    async fn upsert(&self, entry: IndexEntry) -> Result<(), IndexError> {
        self.upsert_sync(entry)
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexHit>, IndexError> {
        self.query_sync(vector, top_k)
    }

    async fn len(&self) -> Result<usize, IndexError> {
        self.len_sync()
    }

    async fn is_available(&self) -> bool {
        self.conn()
            .and_then(|conn| {
                conn.query_row("SELECT 1", [], |_| Ok(()))
                    .map_err(backend)
            })
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sema_core::Metadata;

    fn entry(id: &str, vector: Vec<f32>, ts: i64) -> IndexEntry {
        let mut metadata = Metadata::new();
        metadata.insert("mime".to_string(), serde_json::json!("text/plain"));

        IndexEntry {
            id: id.to_string(),
            vector,
            payload: IndexPayload {
                filename: format!("{}.txt", id),
                content: format!("content of {}", id),
                created_at: Utc.timestamp_opt(ts, 0).unwrap(),
                metadata,
            },
        }
    }

    #[tokio::test]
    async fn test_upsert_and_query_roundtrip() {
        let index = SqliteVectorIndex::open_in_memory("test-model", 3).unwrap();
        index
            .upsert(entry("a", vec![1.0, 0.0, 0.0], 100))
            .await
            .unwrap();
        index
            .upsert(entry("b", vec![0.0, 1.0, 0.0], 200))
            .await
            .unwrap();

        let hits = index.query(&[0.9, 0.1, 0.0], 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a");
        assert_eq!(hits[0].payload.content, "content of a");
        assert_eq!(hits[0].payload.metadata["mime"], "text/plain");
    }

    #[tokio::test]
    async fn test_upsert_overwrites_no_duplicates() {
        let index = SqliteVectorIndex::open_in_memory("test-model", 2).unwrap();
        index.upsert(entry("a", vec![1.0, 0.0], 100)).await.unwrap();
        index.upsert(entry("a", vec![0.0, 1.0], 100)).await.unwrap();

        assert_eq!(index.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_read_after_write_visibility() {
        let index = SqliteVectorIndex::open_in_memory("test-model", 2).unwrap();
        index.upsert(entry("a", vec![1.0, 0.0], 100)).await.unwrap();

        let hits = index.query(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");
    }

    #[tokio::test]
    async fn test_tie_break_is_deterministic() {
        let index = SqliteVectorIndex::open_in_memory("test-model", 2).unwrap();
        // Identical vectors, identical scores
        index.upsert(entry("z", vec![1.0, 0.0], 200)).await.unwrap();
        index.upsert(entry("a", vec![1.0, 0.0], 200)).await.unwrap();
        index.upsert(entry("m", vec![1.0, 0.0], 100)).await.unwrap();

        let first = index.query(&[1.0, 0.0], 10).await.unwrap();
        let second = index.query(&[1.0, 0.0], 10).await.unwrap();

        let order: Vec<&str> = first.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(order, vec!["m", "a", "z"]);
        assert_eq!(
            order,
            second.iter().map(|h| h.id.as_str()).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        let index = SqliteVectorIndex::open_in_memory("test-model", 3).unwrap();
        let err = index
            .upsert(entry("a", vec![1.0, 0.0], 100))
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_model_pinned_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.db");

        {
            let index = SqliteVectorIndex::open(&path, "model-a", 2).unwrap();
            index.upsert(entry("a", vec![1.0, 0.0], 100)).await.unwrap();
        }

        // Same model reopens fine
        assert!(SqliteVectorIndex::open(&path, "model-a", 2).is_ok());

        // Different model is refused
        let err = SqliteVectorIndex::open(&path, "model-b", 2).unwrap_err();
        assert!(matches!(err, IndexError::ModelMismatch { .. }));

        // Different dimension is refused
        let err = SqliteVectorIndex::open(&path, "model-a", 4).unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_empty_index_returns_empty() {
        let index = SqliteVectorIndex::open_in_memory("test-model", 2).unwrap();
        let hits = index.query(&[1.0, 0.0], 5).await.unwrap();
        assert!(hits.is_empty());
    }
}
