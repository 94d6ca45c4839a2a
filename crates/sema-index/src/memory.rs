//! In-memory backends for tests and ephemeral runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use sema_core::{
    BlobLocation, BlobStore, IndexEntry, IndexError, IndexHit, IndexPayload, StorageError,
    VectorIndex,
};

use crate::similarity::{cosine_similarity, rank_hits};

/// In-memory key-to-bytes map with the same overwrite policy as the
/// filesystem store.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<BlobLocation, StorageError> {
        self.blobs
            .write()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
        Ok(BlobLocation(key.to_string()))
    }

    async fn get(&self, location: &BlobLocation) -> Result<Vec<u8>, StorageError> {
        self.blobs
            .read()
            .unwrap()
            .get(&location.0)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                location: location.0.clone(),
            })
    }

    async fn is_available(&self) -> bool {
        true
    }
}

/// In-memory vector index: brute-force cosine over a map, with the same
/// deterministic ordering as the SQLite backend.
pub struct MemoryVectorIndex {
    dimension: usize,
    entries: RwLock<HashMap<String, (Vec<f32>, IndexPayload)>>,
}

impl MemoryVectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn upsert(&self, entry: IndexEntry) -> Result<(), IndexError> {
        if entry.vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: entry.vector.len(),
            });
        }

        self.entries
            .write()
            .unwrap()
            .insert(entry.id, (entry.vector, entry.payload));
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexHit>, IndexError> {
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let entries = self.entries.read().unwrap();
        let candidates: Vec<IndexHit> = entries
            .iter()
            .map(|(id, (stored, payload))| IndexHit {
                id: id.clone(),
                score: cosine_similarity(vector, stored),
                payload: payload.clone(),
            })
            .collect();

        rank_hits(candidates, top_k)
    }

    async fn len(&self) -> Result<usize, IndexError> {
        Ok(self.entries.read().unwrap().len())
    }

    async fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(id: &str, vector: Vec<f32>) -> IndexEntry {
        IndexEntry {
            id: id.to_string(),
            vector,
            payload: IndexPayload {
                filename: format!("{}.txt", id),
                content: format!("content of {}", id),
                created_at: Utc::now(),
                metadata: Default::default(),
            },
        }
    }

    #[tokio::test]
    async fn test_upsert_and_query() {
        let index = MemoryVectorIndex::new(3);
        index.upsert(entry("a", vec![1.0, 0.0, 0.0])).await.unwrap();
        index.upsert(entry("b", vec![0.0, 1.0, 0.0])).await.unwrap();

        let hits = index.query(&[0.9, 0.1, 0.0], 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a");
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn test_upsert_same_id_overwrites() {
        let index = MemoryVectorIndex::new(2);
        index.upsert(entry("a", vec![1.0, 0.0])).await.unwrap();
        index.upsert(entry("a", vec![0.0, 1.0])).await.unwrap();

        assert_eq!(index.len().await.unwrap(), 1);
        let hits = index.query(&[0.0, 1.0], 1).await.unwrap();
        assert!((hits[0].score - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_top_k_beyond_corpus_returns_all() {
        let index = MemoryVectorIndex::new(2);
        index.upsert(entry("a", vec![1.0, 0.0])).await.unwrap();

        let hits = index.query(&[1.0, 0.0], 50).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_zero_top_k_rejected() {
        let index = MemoryVectorIndex::new(2);
        let err = index.query(&[1.0, 0.0], 0).await.unwrap_err();
        assert!(matches!(err, IndexError::InvalidTopK { .. }));
    }

    #[tokio::test]
    async fn test_dimension_checked() {
        let index = MemoryVectorIndex::new(3);
        let err = index.upsert(entry("a", vec![1.0])).await.unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_blob_store_roundtrip() {
        let store = MemoryBlobStore::new();
        let location = store.put("documents/x/y.txt", b"data").await.unwrap();
        assert_eq!(store.get(&location).await.unwrap(), b"data");

        store.put("documents/x/y.txt", b"data2").await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&location).await.unwrap(), b"data2");
    }
}
