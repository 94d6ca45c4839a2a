//! Sema Config - Configuration structures, loading, and application paths.

mod config;
mod error;
mod paths;

pub use config::{Config, EmbeddingConfig, PipelineConfig, StorageConfig, UiConfig};
pub use error::{ConfigError, ConfigResult};
pub use paths::AppPaths;
