//! Feature implementations for offline-queue.
//!
//! - Sync: the operations queue, its compaction rules and save-cycle context

pub mod sync;
