//! CLI command implementations.

pub mod ingest;
pub mod init;
pub mod query;
pub mod status;

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use sema_config::{AppPaths, Config};
use sema_core::{BlobStore, EmbeddingGenerator, VectorIndex};
use sema_index::{FsBlobStore, SqliteVectorIndex};

/// Get the application paths, honoring a configured data_dir override.
pub fn get_paths(config: &Config) -> Result<AppPaths> {
    match &config.storage.data_dir {
        Some(dir) => Ok(AppPaths::with_data_dir(PathBuf::from(dir))),
        None => AppPaths::new().context("Failed to determine application directories"),
    }
}

/// The wired backends every command runs against.
pub struct Components {
    pub blob_store: Arc<dyn BlobStore>,
    pub index: Arc<dyn VectorIndex>,
    pub embedder: Arc<dyn EmbeddingGenerator>,
}

/// Build the configured backends, ensuring sema is initialized. The
/// index is opened against the embedder's model id, so a model change
/// without re-indexing is refused up front.
pub fn build_components(config: &Config) -> Result<Components> {
    let paths = get_paths(config)?;

    if !paths.is_initialized() {
        anyhow::bail!("Sema is not initialized. Run 'sema init' first.");
    }

    let embedder =
        sema_embed::build_embedder(&config.embedding).context("Failed to build embedder")?;

    let blob_store =
        Arc::new(FsBlobStore::new(&paths.blob_dir).context("Failed to open blob store")?);

    let index = Arc::new(
        SqliteVectorIndex::open(&paths.index_file, embedder.model_id(), embedder.dimension())
            .context("Failed to open vector index")?,
    );

    Ok(Components {
        blob_store,
        index,
        embedder,
    })
}

/// Truncate a string to a maximum length.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
