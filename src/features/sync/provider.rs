//! Synchronization provider interface.
//!
//! Replaying the queue against a remote is the host's concern. The context
//! hands the provider the queued rows and drops whatever it acknowledges.

use thiserror::Error;
use uuid::Uuid;

use super::operation::PendingOperation;
use super::store::StoreError;

/// Synchronization failed.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("no synchronization provider configured")]
    NotConfigured,

    #[error("remote rejected synchronization: {0}")]
    Remote(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Pushes queued operations to a remote.
pub trait SynchronizationProvider: Send + Sync {
    /// Replay operations, oldest first.
    ///
    /// Returns the transaction ids the remote accepted. Unacknowledged rows
    /// stay queued.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] if the remote cannot be reached.
    fn push(&self, operations: &[PendingOperation]) -> Result<Vec<Uuid>, SyncError>;
}

/// Provider used when the host has not configured one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSynchronizationProvider;

impl SynchronizationProvider for NullSynchronizationProvider {
    fn push(&self, _operations: &[PendingOperation]) -> Result<Vec<Uuid>, SyncError> {
        Err(SyncError::NotConfigured)
    }
}
