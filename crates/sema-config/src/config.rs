//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &PathBuf) -> ConfigResult<()> {
        let default_config = Self::default_config_string();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, default_config)?;
        Ok(())
    }

    /// Reject configurations the pipelines cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.embedding.dimension == 0 {
            return Err(ConfigError::Invalid(
                "embedding.dimension must be greater than zero".to_string(),
            ));
        }
        if self.embedding.chunk_chars == 0 {
            return Err(ConfigError::Invalid(
                "embedding.chunk_chars must be greater than zero".to_string(),
            ));
        }
        if self.embedding.chunk_overlap >= self.embedding.chunk_chars {
            return Err(ConfigError::Invalid(
                "embedding.chunk_overlap must be smaller than chunk_chars".to_string(),
            ));
        }
        if self.pipeline.max_concurrent == 0 {
            return Err(ConfigError::Invalid(
                "pipeline.max_concurrent must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Sema Configuration
# Document ingestion and semantic retrieval

[storage]
# Data directory for blobs and the vector index
# data_dir = "~/.local/share/sema"

[embedding]
# Embedding server address (Ollama-compatible API)
host = "http://localhost:11434"

# Model used for both document and query embeddings.
# Changing the model requires re-indexing the whole corpus.
model = "all-minilm"

# Output dimension of the model above
dimension = 384

# Request timeout in seconds
timeout_seconds = 120

# Window size and overlap (characters) for long documents
chunk_chars = 2000
chunk_overlap = 200

# Use the built-in deterministic hashing embedder instead of the
# embedding server. No semantic quality, but fully offline.
offline = false

[pipeline]
# Concurrent files per ingestion batch
max_concurrent = 4

# Retry budget for transient backend failures
retry_attempts = 3
retry_backoff_ms = 200

[ui]
# Enable colored output
color = true
"#
        .to_string()
    }
}

/// Storage locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Override for the platform data directory.
    pub data_dir: Option<String>,
}

/// Embedding backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub host: String,
    pub model: String,
    pub dimension: usize,
    pub timeout_seconds: u64,
    pub chunk_chars: usize,
    pub chunk_overlap: usize,
    pub offline: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "all-minilm".to_string(),
            dimension: 384,
            timeout_seconds: 120,
            chunk_chars: 2000,
            chunk_overlap: 200,
            offline: false,
        }
    }
}

/// Ingestion/retrieval orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_concurrent: usize,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            retry_attempts: 3,
            retry_backoff_ms: 200,
        }
    }
}

/// UI/Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub color: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { color: true }
    }
}
