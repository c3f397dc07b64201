//! Path resolution for offline-queue configuration and data files.
//!
//! Everything lives in `~/.offline-queue/`:
//! - `config.yaml` - Main configuration file
//! - `queue.db` - `SQLite` database holding the queue and bookmarks

use std::path::PathBuf;

use crate::error::OfflineError;

/// Paths to offline-queue configuration and data files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.offline-queue/`
    pub root: PathBuf,
    /// Config file: `~/.offline-queue/config.yaml`
    pub config_file: PathBuf,
    /// Database file: `~/.offline-queue/queue.db`
    pub database: PathBuf,
}

impl Paths {
    /// Create paths based on the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, OfflineError> {
        let home = std::env::var("HOME").map_err(|_| {
            OfflineError::Config("Could not determine home directory".to_string())
        })?;

        Ok(Self::with_root(PathBuf::from(home).join(".offline-queue")))
    }

    /// Create paths with a custom root directory.
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            database: root.join("queue.db"),
            root,
        }
    }

    /// Ensure the root directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), OfflineError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                OfflineError::Config(format!(
                    "Failed to create directory {}: {e}",
                    self.root.display()
                ))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_with_root() {
        let root = PathBuf::from("/tmp/test-offline-queue");
        let paths = Paths::with_root(root.clone());

        assert_eq!(paths.root, root);
        assert_eq!(paths.config_file, root.join("config.yaml"));
        assert_eq!(paths.database, root.join("queue.db"));
    }

    #[test]
    fn test_ensure_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_root(temp_dir.path().join("nested").join("root"));

        paths.ensure_dirs().unwrap();
        assert!(paths.root.is_dir());

        // Idempotent
        paths.ensure_dirs().unwrap();
    }
}
