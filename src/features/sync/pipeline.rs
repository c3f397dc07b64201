//! Ingestion of a save cycle's detected changes into the queue.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use super::bookmark::SyncBookmark;
use super::compaction::{self, CompactionResult, MergeError};
use super::operation::{MutationKind, PendingOperation};
use super::serializer::{SerializeError, SnapshotSerializer};
use super::store::{QueueStore, StoreError};
use crate::core::{identity, Entity, EntityClassifier, IdentityError};

/// Entity types that hold the queue's own bookkeeping and are never queued.
pub const BOOKKEEPING_TYPES: [&str; 2] = [PendingOperation::ENTITY_TYPE, SyncBookmark::ENTITY_TYPE];

/// A batch could not be ingested. The whole save cycle must fail.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One detected change: an entity instance and what happened to it.
#[derive(Clone, Copy)]
pub struct Change<'a> {
    pub entity: &'a dyn Entity,
    pub kind: MutationKind,
}

impl<'a> Change<'a> {
    pub fn new(entity: &'a dyn Entity, kind: MutationKind) -> Self {
        Self { entity, kind }
    }

    pub fn created(entity: &'a dyn Entity) -> Self {
        Self::new(entity, MutationKind::Created)
    }

    pub fn updated(entity: &'a dyn Entity) -> Self {
        Self::new(entity, MutationKind::Updated)
    }

    pub fn deleted(entity: &'a dyn Entity) -> Self {
        Self::new(entity, MutationKind::Deleted)
    }
}

impl std::fmt::Debug for Change<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Change")
            .field("entity_type", &self.entity.entity_type())
            .field("kind", &self.kind)
            .finish()
    }
}

/// Counts of queue writes performed for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Rows inserted
    pub inserted: usize,
    /// Rows merged in place
    pub updated: usize,
    /// Rows removed
    pub removed: usize,
    /// Changes that caused no queue activity
    pub skipped: usize,
}

impl BatchSummary {
    /// Total number of changes seen.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.inserted + self.updated + self.removed + self.skipped
    }

    /// Check if the batch wrote to the queue.
    #[must_use]
    pub const fn has_writes(&self) -> bool {
        self.inserted + self.updated + self.removed > 0
    }
}

/// Classifies, identifies, compacts and persists a batch of changes.
pub struct IngestionPipeline<'a> {
    classifier: &'a EntityClassifier,
    serializer: &'a dyn SnapshotSerializer,
}

impl<'a> IngestionPipeline<'a> {
    /// Create a pipeline over a shared classifier and serializer.
    #[must_use]
    pub fn new(classifier: &'a EntityClassifier, serializer: &'a dyn SnapshotSerializer) -> Self {
        Self {
            classifier,
            serializer,
        }
    }

    /// Ingest every change of one save cycle, in order.
    ///
    /// Processing stops at the first error. Writes already issued to `store`
    /// are only undone if the store runs inside a transaction the caller rolls
    /// back.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] for identity, merge, serialization or store
    /// failures.
    pub fn ingest_batch<S>(&self, store: &S, changes: &[Change<'_>]) -> Result<BatchSummary, PipelineError>
    where
        S: QueueStore + ?Sized,
    {
        let mut summary = BatchSummary::default();
        for change in changes {
            let result = self.ingest_one(store, change).inspect_err(|e| {
                warn!(entity_type = change.entity.entity_type(), kind = %change.kind, error = %e, "rejecting batch");
            })?;
            match result {
                CompactionResult::Insert(_) => summary.inserted += 1,
                CompactionResult::Update(_) => summary.updated += 1,
                CompactionResult::Delete(_) => summary.removed += 1,
                CompactionResult::NoOp => summary.skipped += 1,
            }
        }
        Ok(summary)
    }

    fn ingest_one<S>(&self, store: &S, change: &Change<'_>) -> Result<CompactionResult, PipelineError>
    where
        S: QueueStore + ?Sized,
    {
        let entity = change.entity;
        let entity_type = entity.entity_type();

        if BOOKKEEPING_TYPES.contains(&entity_type) {
            debug!(entity_type, "skipping queue bookkeeping entity");
            return Ok(CompactionResult::NoOp);
        }
        if !change.kind.is_tracked() {
            return Ok(CompactionResult::NoOp);
        }
        if !self.classifier.is_remote_tracked(entity)? {
            debug!(entity_type, "skipping local-only entity");
            return Ok(CompactionResult::NoOp);
        }

        let id = identity::resolve(entity)?;
        let existing = store.find(entity_type, id.as_str())?;
        let result = compaction::merge(
            existing,
            change.kind,
            entity_type,
            id.as_str(),
            Utc::now(),
            || self.serializer.serialize(entity).map_err(PipelineError::from),
        )?;

        match &result {
            CompactionResult::Insert(op) => store.insert(op)?,
            CompactionResult::Update(op) => store.update(op)?,
            CompactionResult::Delete(transaction_id) => store.delete(*transaction_id)?,
            CompactionResult::NoOp => {}
        }
        debug!(entity_type, entity_id = %id, kind = %change.kind, ?result, "queued change");

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::{always, eq};

    use super::*;
    use crate::core::{Field, RemoteTable};
    use crate::features::sync::memory::MemoryQueueStore;
    use crate::features::sync::operation::OperationKind;
    use crate::features::sync::serializer::JsonSnapshotSerializer;
    use crate::features::sync::store::MockQueueStore;

    #[derive(Clone)]
    struct Movie {
        id: String,
        title: String,
    }

    impl Movie {
        fn new(id: &str, title: &str) -> Self {
            Self {
                id: id.to_string(),
                title: title.to_string(),
            }
        }
    }

    impl Entity for Movie {
        fn entity_type(&self) -> &'static str {
            "movie"
        }

        fn remote_table(&self) -> Option<RemoteTable> {
            Some(RemoteTable::default_path())
        }

        fn fields(&self) -> Vec<Field> {
            vec![Field::new("Id", self.id.clone()), Field::new("Title", self.title.clone())]
        }
    }

    struct Note;

    impl Entity for Note {
        fn entity_type(&self) -> &'static str {
            "note"
        }

        fn fields(&self) -> Vec<Field> {
            vec![Field::new("Id", "n1")]
        }
    }

    struct Broken;

    impl Entity for Broken {
        fn entity_type(&self) -> &'static str {
            "broken"
        }

        fn remote_table(&self) -> Option<RemoteTable> {
            Some(RemoteTable::at("/tables/broken"))
        }

        fn fields(&self) -> Vec<Field> {
            vec![Field::new("Id", "a"), Field::new("ID", "b")]
        }
    }

    struct FailingSerializer;

    impl SnapshotSerializer for FailingSerializer {
        fn serialize(&self, entity: &dyn Entity) -> Result<String, SerializeError> {
            Err(SerializeError::Custom {
                entity_type: entity.entity_type().to_string(),
                message: "boom".to_string(),
            })
        }
    }

    fn ingest(store: &MemoryQueueStore, changes: &[Change<'_>]) -> Result<BatchSummary, PipelineError> {
        let classifier = EntityClassifier::new();
        let serializer = JsonSnapshotSerializer::new();
        IngestionPipeline::new(&classifier, &serializer).ingest_batch(store, changes)
    }

    #[test]
    fn test_created_inserts_add() {
        let store = MemoryQueueStore::new();
        let movie = Movie::new("m1", "Alien");
        let summary = ingest(&store, &[Change::created(&movie)]).unwrap();
        assert_eq!(summary.inserted, 1);

        let op = store.find("movie", "m1").unwrap().unwrap();
        assert_eq!(op.operation_kind, OperationKind::Add);
        assert_eq!(op.snapshot, r#"{"Id":"m1","Title":"Alien"}"#);
    }

    #[test]
    fn test_add_update_update_collapses() {
        let store = MemoryQueueStore::new();
        let mut movie = Movie::new("m1", "Alien");
        ingest(&store, &[Change::created(&movie)]).unwrap();
        let first = store.find("movie", "m1").unwrap().unwrap();

        movie.title = "Aliens".to_string();
        ingest(&store, &[Change::updated(&movie)]).unwrap();
        movie.title = "Alien 3".to_string();
        ingest(&store, &[Change::updated(&movie)]).unwrap();

        assert_eq!(store.len(), 1);
        let op = store.find("movie", "m1").unwrap().unwrap();
        assert_eq!(op.operation_kind, OperationKind::Add);
        assert_eq!(op.snapshot, r#"{"Id":"m1","Title":"Alien 3"}"#);
        assert_eq!(op.transaction_id, first.transaction_id);
        assert_eq!(op.created_at, first.created_at);
        assert!(op.updated_at > op.created_at);
    }

    #[test]
    fn test_add_delete_nets_to_nothing() {
        let store = MemoryQueueStore::new();
        let movie = Movie::new("m1", "Alien");
        ingest(&store, &[Change::created(&movie)]).unwrap();
        let summary = ingest(&store, &[Change::deleted(&movie)]).unwrap();
        assert_eq!(summary.removed, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_replace_delete_degrades_to_delete() {
        let store = MemoryQueueStore::new();
        let movie = Movie::new("m1", "Alien");
        ingest(&store, &[Change::updated(&movie)]).unwrap();
        let replaced = store.find("movie", "m1").unwrap().unwrap();
        assert_eq!(replaced.operation_kind, OperationKind::Replace);

        ingest(&store, &[Change::deleted(&movie)]).unwrap();
        let op = store.find("movie", "m1").unwrap().unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(op.operation_kind, OperationKind::Delete);
        assert_eq!(op.transaction_id, replaced.transaction_id);
    }

    #[test]
    fn test_illegal_transitions_leave_row_unchanged() {
        for kind in [MutationKind::Created, MutationKind::Updated, MutationKind::Deleted] {
            let store = MemoryQueueStore::new();
            let movie = Movie::new("m1", "Alien");
            ingest(&store, &[Change::deleted(&movie)]).unwrap();
            let before = store.find("movie", "m1").unwrap().unwrap();

            let err = ingest(&store, &[Change::new(&movie, kind)]).unwrap_err();
            assert!(matches!(err, PipelineError::Merge(_)));
            assert_eq!(store.find("movie", "m1").unwrap().unwrap(), before);
            assert_eq!(store.len(), 1);
        }
    }

    #[test]
    fn test_at_most_one_row_per_identity() {
        let store = MemoryQueueStore::new();
        let movie = Movie::new("m1", "Alien");
        let sequence = [
            Change::updated(&movie),
            Change::updated(&movie),
            Change::deleted(&movie),
        ];
        for change in sequence {
            ingest(&store, &[change]).unwrap();
            assert!(store.len() <= 1);
        }
    }

    #[test]
    fn test_local_only_entities_are_skipped() {
        let store = MemoryQueueStore::new();
        let summary = ingest(&store, &[Change::created(&Note)]).unwrap();
        assert_eq!(summary.skipped, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_untracked_kinds_are_skipped() {
        let store = MemoryQueueStore::new();
        let movie = Movie::new("m1", "Alien");
        let summary = ingest(
            &store,
            &[
                Change::new(&movie, MutationKind::Unchanged),
                Change::new(&movie, MutationKind::Detached),
            ],
        )
        .unwrap();
        assert_eq!(summary.skipped, 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_bookkeeping_entities_are_skipped() {
        let store = MemoryQueueStore::new();
        let row = PendingOperation::new(OperationKind::Add, "note", "n1", "{}".into(), Utc::now());
        let bookmark = SyncBookmark::new("movies", 42);
        let summary = ingest(&store, &[Change::created(&row), Change::created(&bookmark)]).unwrap();
        assert_eq!(summary.skipped, 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_empty_identity_fails_batch() {
        let store = MemoryQueueStore::new();
        let movie = Movie::new("", "Nameless");
        let err = ingest(&store, &[Change::created(&movie)]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Identity(IdentityError::EmptyIdentity { .. })
        ));
    }

    #[test]
    fn test_identity_error_fails_batch() {
        let store = MemoryQueueStore::new();
        let err = ingest(&store, &[Change::created(&Broken)]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Identity(IdentityError::AmbiguousConventionalId { .. })
        ));
    }

    #[test]
    fn test_serialization_failure_fails_batch() {
        let store = MemoryQueueStore::new();
        let classifier = EntityClassifier::new();
        let pipeline = IngestionPipeline::new(&classifier, &FailingSerializer);
        let movie = Movie::new("m1", "Alien");
        let err = pipeline.ingest_batch(&store, &[Change::created(&movie)]).unwrap_err();
        assert!(matches!(err, PipelineError::Serialize(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_batch_stops_at_first_error() {
        let store = MemoryQueueStore::new();
        let a = Movie::new("a", "A");
        let b = Movie::new("b", "B");
        let result = ingest(&store, &[Change::created(&a), Change::created(&Broken), Change::created(&b)]);
        assert!(result.is_err());
        assert!(store.find("movie", "b").unwrap().is_none());
    }

    #[test]
    fn test_merge_error_issues_no_writes() {
        let existing = PendingOperation::new(OperationKind::Delete, "movie", "m1", "{}".into(), Utc::now());
        let mut store = MockQueueStore::new();
        store
            .expect_find()
            .with(eq("movie"), eq("m1"))
            .times(1)
            .returning(move |_, _| Ok(Some(existing.clone())));
        store.expect_insert().never();
        store.expect_update().never();
        store.expect_delete().never();

        let classifier = EntityClassifier::new();
        let serializer = JsonSnapshotSerializer::new();
        let movie = Movie::new("m1", "Alien");
        let err = IngestionPipeline::new(&classifier, &serializer)
            .ingest_batch(&store, &[Change::updated(&movie)])
            .unwrap_err();
        assert!(matches!(err, PipelineError::Merge(MergeError::MutateAfterDelete { .. })));
    }

    #[test]
    fn test_store_error_propagates() {
        let mut store = MockQueueStore::new();
        store.expect_find().returning(|_, _| Ok(None));
        store
            .expect_insert()
            .with(always())
            .times(1)
            .returning(|op| {
                Err(StoreError::Duplicate {
                    entity_type: op.entity_type.clone(),
                    entity_id: op.entity_id.clone(),
                })
            });

        let classifier = EntityClassifier::new();
        let serializer = JsonSnapshotSerializer::new();
        let movie = Movie::new("m1", "Alien");
        let err = IngestionPipeline::new(&classifier, &serializer)
            .ingest_batch(&store, &[Change::created(&movie)])
            .unwrap_err();
        assert!(matches!(err, PipelineError::Store(StoreError::Duplicate { .. })));
    }
}
