//! Queue compaction.
//!
//! Merges an incoming local mutation into the pending operation already queued
//! for the same identity. Per identity the queued kind moves through
//! `{absent, Add, Replace, Delete}`:
//!
//! | existing | Created       | Updated             | Deleted            |
//! |----------|---------------|---------------------|--------------------|
//! | absent   | insert Add    | insert Replace      | insert Delete      |
//! | Add      | error         | refresh snapshot    | remove row         |
//! | Replace  | error         | refresh snapshot    | becomes Delete     |
//! | Delete   | error         | error               | error              |
//!
//! `Delete` is terminal until the row is cleared by a successful replay.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::operation::{MutationKind, OperationKind, PendingOperation};

/// An incoming mutation contradicts the operation already queued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("cannot add {entity_type} '{entity_id}': an add is already queued")]
    AddAfterAdd { entity_type: String, entity_id: String },

    #[error("cannot add {entity_type} '{entity_id}': a delete is queued")]
    AddAfterDelete { entity_type: String, entity_id: String },

    #[error("cannot modify {entity_type} '{entity_id}': a delete is queued")]
    MutateAfterDelete { entity_type: String, entity_id: String },

    #[error("cannot delete {entity_type} '{entity_id}': a delete is already queued")]
    DeleteAfterDelete { entity_type: String, entity_id: String },

    #[error("cannot add {entity_type} '{entity_id}': it already exists remotely")]
    AddAfterReplace { entity_type: String, entity_id: String },

    #[error("queued operation {transaction_id} has an invalid operation kind")]
    InvalidExisting { transaction_id: Uuid },
}

/// What the store must do to reflect a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompactionResult {
    /// Insert a new row.
    Insert(PendingOperation),
    /// Overwrite the existing row.
    Update(PendingOperation),
    /// Remove the row with this transaction id.
    Delete(Uuid),
    /// Leave the queue untouched.
    NoOp,
}

/// Merge an incoming mutation against the existing queued operation.
///
/// `snapshot` is only called when the result writes a new snapshot, and never
/// before an illegal transition has been ruled out.
///
/// # Errors
///
/// Returns a [`MergeError`] (converted into `E`) for illegal transitions, or
/// whatever error `snapshot` produces.
pub fn merge<F, E>(
    existing: Option<PendingOperation>,
    incoming: MutationKind,
    entity_type: &str,
    entity_id: &str,
    now: DateTime<Utc>,
    snapshot: F,
) -> Result<CompactionResult, E>
where
    F: FnOnce() -> Result<String, E>,
    E: From<MergeError>,
{
    if !incoming.is_tracked() {
        return Ok(CompactionResult::NoOp);
    }

    let Some(mut row) = existing else {
        let op = PendingOperation::new(
            incoming.initial_operation(),
            entity_type,
            entity_id,
            snapshot()?,
            now,
        );
        return Ok(CompactionResult::Insert(op));
    };

    let entity_type = entity_type.to_string();
    let entity_id = entity_id.to_string();

    match (row.operation_kind, incoming) {
        (OperationKind::Add | OperationKind::Replace, MutationKind::Updated) => {
            row.snapshot = snapshot()?;
            row.touch(now);
            Ok(CompactionResult::Update(row))
        }
        // Never sent to the remote, so there is nothing to replay.
        (OperationKind::Add, MutationKind::Deleted) => {
            Ok(CompactionResult::Delete(row.transaction_id))
        }
        // The remote still holds the pre-replace entity; the last snapshot is kept.
        (OperationKind::Replace, MutationKind::Deleted) => {
            row.operation_kind = OperationKind::Delete;
            row.touch(now);
            Ok(CompactionResult::Update(row))
        }
        (OperationKind::Add, MutationKind::Created) => Err(MergeError::AddAfterAdd {
            entity_type,
            entity_id,
        }
        .into()),
        (OperationKind::Replace, MutationKind::Created) => Err(MergeError::AddAfterReplace {
            entity_type,
            entity_id,
        }
        .into()),
        (OperationKind::Delete, MutationKind::Created) => Err(MergeError::AddAfterDelete {
            entity_type,
            entity_id,
        }
        .into()),
        (OperationKind::Delete, MutationKind::Updated) => Err(MergeError::MutateAfterDelete {
            entity_type,
            entity_id,
        }
        .into()),
        (OperationKind::Delete, MutationKind::Deleted) => Err(MergeError::DeleteAfterDelete {
            entity_type,
            entity_id,
        }
        .into()),
        (OperationKind::Unknown, _) => Err(MergeError::InvalidExisting {
            transaction_id: row.transaction_id,
        }
        .into()),
        (_, MutationKind::Unchanged | MutationKind::Detached) => Ok(CompactionResult::NoOp),
    }
}
