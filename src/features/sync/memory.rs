//! In-memory queue store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use super::operation::PendingOperation;
use super::store::{QueueStore, StoreError};

/// Queue store kept in process memory, keyed by transaction id.
#[derive(Debug, Default)]
pub struct MemoryQueueStore {
    rows: Mutex<HashMap<Uuid, PendingOperation>>,
}

impl MemoryQueueStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> MutexGuard<'_, HashMap<Uuid, PendingOperation>> {
        // Writes replace whole rows, so a poisoned map is still consistent.
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All rows ordered by creation time.
    #[must_use]
    pub fn all(&self) -> Vec<PendingOperation> {
        let mut rows: Vec<_> = self.rows().values().cloned().collect();
        rows.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.transaction_id.cmp(&b.transaction_id))
        });
        rows
    }

    /// Number of queued rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows().len()
    }

    /// Check if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }
}

impl QueueStore for MemoryQueueStore {
    fn find(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Option<PendingOperation>, StoreError> {
        Ok(self
            .rows()
            .values()
            .find(|op| op.entity_type == entity_type && op.entity_id == entity_id)
            .cloned())
    }

    fn insert(&self, operation: &PendingOperation) -> Result<(), StoreError> {
        let mut rows = self.rows();
        let duplicate = rows.values().any(|op| {
            op.entity_type == operation.entity_type && op.entity_id == operation.entity_id
        });
        if duplicate || rows.contains_key(&operation.transaction_id) {
            return Err(StoreError::Duplicate {
                entity_type: operation.entity_type.clone(),
                entity_id: operation.entity_id.clone(),
            });
        }
        rows.insert(operation.transaction_id, operation.clone());
        Ok(())
    }

    fn update(&self, operation: &PendingOperation) -> Result<(), StoreError> {
        match self.rows().get_mut(&operation.transaction_id) {
            Some(row) => {
                *row = operation.clone();
                Ok(())
            }
            None => Err(StoreError::Missing(operation.transaction_id)),
        }
    }

    fn delete(&self, transaction_id: Uuid) -> Result<(), StoreError> {
        self.rows()
            .remove(&transaction_id)
            .map(|_| ())
            .ok_or(StoreError::Missing(transaction_id))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::features::sync::operation::OperationKind;

    fn op(entity_id: &str) -> PendingOperation {
        PendingOperation::new(OperationKind::Add, "movie", entity_id, "{}".into(), Utc::now())
    }

    #[test]
    fn test_insert_and_find() {
        let store = MemoryQueueStore::new();
        let row = op("m1");
        store.insert(&row).unwrap();

        assert_eq!(store.find("movie", "m1").unwrap(), Some(row));
        assert!(store.find("movie", "m2").unwrap().is_none());
        assert!(store.find("book", "m1").unwrap().is_none());
    }

    #[test]
    fn test_insert_rejects_duplicate_identity() {
        let store = MemoryQueueStore::new();
        store.insert(&op("m1")).unwrap();
        let err = store.insert(&op("m1")).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_replaces_row() {
        let store = MemoryQueueStore::new();
        let mut row = op("m1");
        store.insert(&row).unwrap();

        row.operation_kind = OperationKind::Replace;
        row.snapshot = "{\"v\":2}".into();
        store.update(&row).unwrap();
        assert_eq!(store.find("movie", "m1").unwrap(), Some(row));
    }

    #[test]
    fn test_missing_rows() {
        let store = MemoryQueueStore::new();
        let row = op("m1");
        assert!(matches!(store.update(&row), Err(StoreError::Missing(_))));
        assert!(matches!(
            store.delete(row.transaction_id),
            Err(StoreError::Missing(id)) if id == row.transaction_id
        ));
    }

    #[test]
    fn test_delete() {
        let store = MemoryQueueStore::new();
        let row = op("m1");
        store.insert(&row).unwrap();
        store.delete(row.transaction_id).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_all_is_ordered() {
        let store = MemoryQueueStore::new();
        let first = op("a");
        let second = PendingOperation::new(
            OperationKind::Add,
            "movie",
            "b",
            "{}".into(),
            first.created_at + chrono::Duration::seconds(1),
        );
        store.insert(&second).unwrap();
        store.insert(&first).unwrap();

        let ids: Vec<_> = store.all().into_iter().map(|op| op.entity_id).collect();
        assert_eq!(ids, ["a", "b"]);
    }
}
