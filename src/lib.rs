//! offline-queue - An offline operations queue with compaction
//!
//! Records local mutations to remote-tracked entities as pending operations,
//! keeps at most one per entity identity by merging successive changes, and
//! persists them in `SQLite` alongside the host's own writes.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod features;
pub mod output;
pub mod storage;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::OfflineError;
pub use features::sync::{Change, OfflineContext, QueueOptions};
