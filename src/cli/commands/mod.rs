//! Command implementations for offline-queue.
//!
//! This module contains the implementation of all CLI commands.

mod queue;

pub use queue::{bookmarks, clear, list, remove, show, status};
