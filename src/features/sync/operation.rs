//! Operation types for the offline queue.
//!
//! Defines the pending operation row, its business operation kind, and the
//! local mutation kinds reported by the change source.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{Entity, Field};

/// The business operation a pending row will replay against the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Uninitialized sentinel. Never persisted.
    Unknown,
    /// Create the entity on the remote.
    Add,
    /// Delete the entity from the remote.
    Delete,
    /// Replace the remote entity with the local field values.
    Replace,
}

impl OperationKind {
    /// Get the display name for this operation kind.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Add => "Add",
            Self::Delete => "Delete",
            Self::Replace => "Replace",
        }
    }

    /// Storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Add => "add",
            Self::Delete => "delete",
            Self::Replace => "replace",
        }
    }

    /// Parse the storage representation.
    ///
    /// Returns `None` for unrecognized strings and for `unknown`, which is
    /// never a valid persisted value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "add" => Some(Self::Add),
            "delete" => Some(Self::Delete),
            "replace" => Some(Self::Replace),
            _ => None,
        }
    }

    /// Check if this kind may be stored.
    #[must_use]
    pub const fn is_persistable(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A local mutation detected by the host's change tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    /// The entity was added locally.
    Created,
    /// The entity was modified locally.
    Updated,
    /// The entity was removed locally.
    Deleted,
    /// The entity is tracked but unchanged.
    Unchanged,
    /// The entity is not tracked.
    Detached,
}

impl MutationKind {
    /// Check if this mutation results in queue activity.
    #[must_use]
    pub const fn is_tracked(&self) -> bool {
        matches!(self, Self::Created | Self::Updated | Self::Deleted)
    }

    /// The operation kind a fresh queue row gets for this mutation.
    #[must_use]
    pub const fn initial_operation(&self) -> OperationKind {
        match self {
            Self::Created => OperationKind::Add,
            Self::Updated => OperationKind::Replace,
            Self::Deleted => OperationKind::Delete,
            Self::Unchanged | Self::Detached => OperationKind::Unknown,
        }
    }
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Unchanged => "unchanged",
            Self::Detached => "detached",
        };
        write!(f, "{s}")
    }
}

/// A queued operation awaiting replay for one entity identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOperation {
    /// Unique ID, stable across merges
    pub transaction_id: Uuid,
    /// When the row was first queued
    pub created_at: DateTime<Utc>,
    /// When the row was last merged
    pub updated_at: DateTime<Utc>,
    /// Operation to replay
    pub operation_kind: OperationKind,
    /// Type of the tracked entity
    pub entity_type: String,
    /// Canonical identity of the tracked entity
    pub entity_id: String,
    /// Serialized entity state
    pub snapshot: String,
}

impl PendingOperation {
    /// Type name under which queue rows would appear in a change stream.
    pub const ENTITY_TYPE: &'static str = "offline_operations_queue";

    /// Create a new row with a fresh transaction id.
    #[must_use]
    pub fn new(
        operation_kind: OperationKind,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        snapshot: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            operation_kind,
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            snapshot,
        }
    }

    /// Refresh `updated_at` after a merge.
    ///
    /// The timestamp never moves backwards and always advances, so a merged
    /// row is strictly newer than its creation even on a coarse clock.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        let floor = self.updated_at + Duration::nanoseconds(1);
        self.updated_at = now.max(floor);
    }
}

impl Entity for PendingOperation {
    fn entity_type(&self) -> &'static str {
        Self::ENTITY_TYPE
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::key("transaction_id", self.transaction_id),
            Field::new("created_at", self.created_at),
            Field::new("updated_at", self.updated_at),
            Field::new("operation_kind", self.operation_kind.as_str()),
            Field::new("entity_type", self.entity_type.clone()),
            Field::new("entity_id", self.entity_id.clone()),
            Field::new("snapshot", self.snapshot.clone()),
        ]
    }
}
