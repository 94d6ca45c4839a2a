//! Filesystem blob store.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use sema_core::{BlobLocation, BlobStore, StorageError};

/// Blob store rooted at a directory; keys are slash-separated relative
/// paths. `put` on an existing key deterministically overwrites via a
/// temp-file-and-rename, so readers never observe partial writes.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        // Keys are pipeline-constructed, but refuse traversal outright.
        if key.split('/').any(|part| part == ".." || part.is_empty()) {
            return Err(StorageError::Other(format!("invalid blob key: {}", key)));
        }
        Ok(self.root.join(key))
    }

    /// Root directory, for operators inspecting orphaned blobs.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<BlobLocation, StorageError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp-write");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!("Stored {} byte(s) at {}", bytes.len(), path.display());
        Ok(BlobLocation(key.to_string()))
    }

    async fn get(&self, location: &BlobLocation) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(&location.0)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound {
                location: location.0.clone(),
            }),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn is_available(&self) -> bool {
        tokio::fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FsBlobStore::new(dir.path()).unwrap();

        let location = store
            .put("documents/abc123/report.pdf", b"file bytes")
            .await
            .unwrap();
        let bytes = store.get(&location).await.unwrap();

        assert_eq!(bytes, b"file bytes");
    }

    #[tokio::test]
    async fn test_put_overwrites_existing_key() {
        let dir = tempdir().unwrap();
        let store = FsBlobStore::new(dir.path()).unwrap();

        let location = store.put("documents/k/v.txt", b"first").await.unwrap();
        store.put("documents/k/v.txt", b"second").await.unwrap();

        assert_eq!(store.get(&location).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let store = FsBlobStore::new(dir.path()).unwrap();

        let err = store
            .get(&BlobLocation("documents/none/gone.txt".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_traversal_keys_rejected() {
        let dir = tempdir().unwrap();
        let store = FsBlobStore::new(dir.path()).unwrap();

        let err = store.put("../escape.txt", b"nope").await.unwrap_err();
        assert!(matches!(err, StorageError::Other(_)));
    }

    #[tokio::test]
    async fn test_is_available() {
        let dir = tempdir().unwrap();
        let store = FsBlobStore::new(dir.path()).unwrap();
        assert!(store.is_available().await);
    }
}
