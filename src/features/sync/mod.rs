//! Offline operations queue.
//!
//! Local mutations to remote-tracked entities are recorded as pending
//! operations, at most one per entity identity. Successive mutations are
//! compacted into the existing row so the queue replays the net effect.

pub mod bookmark;
pub mod compaction;
pub mod context;
pub mod memory;
pub mod operation;
pub mod pipeline;
pub mod provider;
pub mod queue;
pub mod serializer;
pub mod store;

pub use bookmark::SyncBookmark;
pub use compaction::{merge, CompactionResult, MergeError};
pub use context::{OfflineContext, QueueOptions};
pub use memory::MemoryQueueStore;
pub use operation::{MutationKind, OperationKind, PendingOperation};
pub use pipeline::{BatchSummary, Change, IngestionPipeline, PipelineError};
pub use provider::{NullSynchronizationProvider, SyncError, SynchronizationProvider};
pub use queue::{QueueStats, SqliteQueueStore};
pub use serializer::{JsonSnapshotSerializer, SerializeError, SnapshotSerializer};
pub use store::{QueueStore, StoreError};
