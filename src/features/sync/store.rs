//! Queue store interface.
//!
//! The pipeline only needs keyed lookup and single-row writes. Implementations
//! are expected to run all writes for one save cycle inside the caller's
//! transaction.

use thiserror::Error;
use uuid::Uuid;

use super::operation::PendingOperation;

/// A queue store operation failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("an operation is already queued for {entity_type} '{entity_id}'")]
    Duplicate {
        entity_type: String,
        entity_id: String,
    },

    #[error("queued operation {0} not found")]
    Missing(Uuid),

    #[error("invalid queue row: {0}")]
    InvalidRow(String),
}

/// Storage for pending operations, keyed by `(entity_type, entity_id)`.
#[cfg_attr(test, mockall::automock)]
pub trait QueueStore {
    /// Find the pending operation for an identity.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the lookup fails.
    fn find(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Option<PendingOperation>, StoreError>;

    /// Insert a new pending operation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] if the identity already has a row.
    fn insert(&self, operation: &PendingOperation) -> Result<(), StoreError>;

    /// Overwrite the row with the same transaction id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Missing`] if no such row exists.
    fn update(&self, operation: &PendingOperation) -> Result<(), StoreError>;

    /// Remove the row with this transaction id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Missing`] if no such row exists.
    fn delete(&self, transaction_id: Uuid) -> Result<(), StoreError>;
}
