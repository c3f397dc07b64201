//! Command-line interface for offline-queue.

pub mod args;
pub mod commands;
