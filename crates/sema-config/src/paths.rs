//! Application paths management.

use directories::ProjectDirs;
use std::path::PathBuf;

/// Manages all application paths following platform conventions.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub config_file: PathBuf,
    pub blob_dir: PathBuf,
    pub index_file: PathBuf,
}

impl AppPaths {
    /// Create paths using platform-specific directories.
    pub fn new() -> Option<Self> {
        let proj_dirs = ProjectDirs::from("dev", "sema", "sema")?;

        let config_dir = proj_dirs.config_dir().to_path_buf();
        let data_dir = proj_dirs.data_dir().to_path_buf();

        Some(Self {
            config_file: config_dir.join("config.toml"),
            blob_dir: data_dir.join("blobs"),
            index_file: data_dir.join("index.db"),
            config_dir,
            data_dir,
        })
    }

    /// Create paths rooted at an explicit data directory override.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        let config_dir = data_dir.clone();
        Self {
            config_file: config_dir.join("config.toml"),
            blob_dir: data_dir.join("blobs"),
            index_file: data_dir.join("index.db"),
            config_dir,
            data_dir,
        }
    }

    /// Create all necessary directories.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.blob_dir)?;
        Ok(())
    }

    /// Check if sema has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.config_file.exists() && self.data_dir.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_paths_creation() {
        let paths = AppPaths::new();
        assert!(paths.is_some());

        let paths = paths.unwrap();
        assert!(paths.config_file.to_string_lossy().contains("config.toml"));
        assert!(paths.index_file.to_string_lossy().contains("index.db"));
    }

    #[test]
    fn test_with_data_dir() {
        let paths = AppPaths::with_data_dir(PathBuf::from("/tmp/sema-test"));
        assert_eq!(paths.blob_dir, PathBuf::from("/tmp/sema-test/blobs"));
        assert_eq!(paths.index_file, PathBuf::from("/tmp/sema-test/index.db"));
    }
}
