//! Save-cycle owner.
//!
//! `OfflineContext` runs every save through one `SQLite` transaction: queue
//! writes from ingestion and the host's own writes commit together or not at
//! all.

use rusqlite::Connection;
use tracing::{debug, info};

use super::bookmark::{self, SyncBookmark};
use super::pipeline::{BatchSummary, Change, IngestionPipeline};
use super::provider::{NullSynchronizationProvider, SynchronizationProvider};
use super::queue::SqliteQueueStore;
use super::serializer::{JsonSnapshotSerializer, SnapshotSerializer};
use crate::config::Config;
use crate::core::EntityClassifier;
use crate::error::OfflineError;
use crate::storage::Database;

/// Per-save queue behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueOptions {
    /// Record changes in the queue. When false only the host's writes run.
    pub add_changes_to_queue: bool,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            add_changes_to_queue: true,
        }
    }
}

impl QueueOptions {
    /// Options that leave the queue untouched.
    #[must_use]
    pub const fn bypass() -> Self {
        Self {
            add_changes_to_queue: false,
        }
    }
}

/// Offline store with an operations queue.
pub struct OfflineContext {
    db: Database,
    classifier: EntityClassifier,
    serializer: Box<dyn SnapshotSerializer>,
    provider: Box<dyn SynchronizationProvider>,
    options: QueueOptions,
}

impl OfflineContext {
    /// Create a context with JSON snapshots and no synchronization provider.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self {
            db,
            classifier: EntityClassifier::new(),
            serializer: Box::new(JsonSnapshotSerializer::new()),
            provider: Box::new(NullSynchronizationProvider),
            options: QueueOptions::default(),
        }
    }

    /// Create a context configured from the `queue` and `serializer` sections.
    #[must_use]
    pub fn from_config(db: Database, config: &Config) -> Self {
        let serializer = if config.serializer.pretty {
            JsonSnapshotSerializer::pretty()
        } else {
            JsonSnapshotSerializer::new()
        };
        Self::new(db)
            .with_serializer(serializer)
            .with_options(QueueOptions {
                add_changes_to_queue: config.queue.add_changes_to_queue,
            })
    }

    #[must_use]
    pub fn with_serializer(mut self, serializer: impl SnapshotSerializer + 'static) -> Self {
        self.serializer = Box::new(serializer);
        self
    }

    #[must_use]
    pub fn with_provider(mut self, provider: impl SynchronizationProvider + 'static) -> Self {
        self.provider = Box::new(provider);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: QueueOptions) -> Self {
        self.options = options;
        self
    }

    /// Default options used by [`Self::save_changes`].
    #[must_use]
    pub const fn options(&self) -> QueueOptions {
        self.options
    }

    /// The underlying database.
    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.db
    }

    /// The shared classification cache.
    #[must_use]
    pub const fn classifier(&self) -> &EntityClassifier {
        &self.classifier
    }

    /// Queue store for inspection outside a save cycle.
    #[must_use]
    pub const fn queue(&self) -> SqliteQueueStore<'_> {
        SqliteQueueStore::new(self.db.connection())
    }

    /// Save a batch of changes with the default options.
    ///
    /// See [`Self::save_changes_with`].
    ///
    /// # Errors
    ///
    /// Returns an error if ingestion, `apply`, or the commit fails. Nothing is
    /// persisted in that case.
    pub fn save_changes<T, F>(&self, changes: &[Change<'_>], apply: F) -> Result<T, OfflineError>
    where
        F: FnOnce(&Connection) -> Result<T, OfflineError>,
    {
        self.save_changes_with(changes, self.options, apply)
    }

    /// Save a batch of changes.
    ///
    /// Ingests `changes` into the queue, then runs `apply` for the host's own
    /// writes, then commits. Both run against the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if ingestion, `apply`, or the commit fails. Nothing is
    /// persisted in that case.
    pub fn save_changes_with<T, F>(
        &self,
        changes: &[Change<'_>],
        options: QueueOptions,
        apply: F,
    ) -> Result<T, OfflineError>
    where
        F: FnOnce(&Connection) -> Result<T, OfflineError>,
    {
        let tx = self.db.connection().unchecked_transaction()?;
        let conn: &Connection = &tx;

        let summary = if options.add_changes_to_queue {
            let pipeline = IngestionPipeline::new(&self.classifier, self.serializer.as_ref());
            pipeline.ingest_batch(&SqliteQueueStore::new(conn), changes)?
        } else {
            debug!(changes = changes.len(), "queue bypassed for this save");
            BatchSummary::default()
        };

        let value = apply(conn)?;
        tx.commit()?;

        info!(
            inserted = summary.inserted,
            updated = summary.updated,
            removed = summary.removed,
            skipped = summary.skipped,
            "save committed"
        );
        Ok(value)
    }

    /// Get the bookmark for a remote table.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn bookmark(&self, table_name: &str) -> Result<Option<SyncBookmark>, OfflineError> {
        Ok(bookmark::get(self.db.connection(), table_name)?)
    }

    /// Record the last synchronized sequence for a remote table.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn set_bookmark(&self, table_name: &str, sequence: i64) -> Result<(), OfflineError> {
        Ok(bookmark::set(
            self.db.connection(),
            &SyncBookmark::new(table_name, sequence),
        )?)
    }

    /// All bookmarks.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn bookmarks(&self) -> Result<Vec<SyncBookmark>, OfflineError> {
        Ok(bookmark::list(self.db.connection())?)
    }

    /// Push the queue to the configured provider and drop acknowledged rows.
    ///
    /// Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns an error if no provider is configured, the push fails, or the
    /// acknowledged rows cannot be removed.
    pub fn synchronize(&self) -> Result<usize, OfflineError> {
        let pending = self.queue().pending(None)?;
        if pending.is_empty() {
            debug!("nothing to synchronize");
            return Ok(0);
        }

        let acknowledged = self.provider.push(&pending)?;

        let tx = self.db.connection().unchecked_transaction()?;
        let store = SqliteQueueStore::new(&tx);
        let mut removed = 0;
        for transaction_id in &acknowledged {
            if store.remove(*transaction_id)? {
                removed += 1;
            }
        }
        tx.commit()?;

        info!(
            pushed = pending.len(),
            acknowledged = removed,
            "synchronization complete"
        );
        Ok(removed)
    }
}
