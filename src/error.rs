//! Error types for offline-queue.

use thiserror::Error;

use crate::features::sync::{PipelineError, StoreError, SyncError};

/// Top-level error for the library and binary.
#[derive(Debug, Error)]
pub enum OfflineError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl From<rusqlite::Error> for OfflineError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}

impl From<StoreError> for OfflineError {
    fn from(e: StoreError) -> Self {
        Self::Database(e.to_string())
    }
}
