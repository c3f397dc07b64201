//! Output formatting for offline-queue.
//!
//! This module provides formatters for displaying queue data in various formats.

mod json;
mod pretty;

use chrono::Utc;

use crate::cli::args::OutputFormat;
use crate::error::OfflineError;
use crate::features::sync::{PendingOperation, QueueStats, SyncBookmark};

pub use json::*;
pub use pretty::*;

/// Format queued operations based on output format
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_operations(
    operations: &[PendingOperation],
    title: &str,
    format: OutputFormat,
) -> Result<String, OfflineError> {
    match format {
        OutputFormat::Pretty => Ok(format_operations_pretty(operations, title)),
        OutputFormat::Json => format_operations_json(operations),
    }
}

/// Format a single operation based on output format
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_operation(op: &PendingOperation, format: OutputFormat) -> Result<String, OfflineError> {
    match format {
        OutputFormat::Pretty => Ok(format_operation_pretty(op)),
        OutputFormat::Json => format_operation_json(op),
    }
}

/// Format queue statistics based on output format
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_stats(stats: &QueueStats, format: OutputFormat) -> Result<String, OfflineError> {
    match format {
        OutputFormat::Pretty => Ok(format_stats_pretty(stats, Utc::now())),
        OutputFormat::Json => format_stats_json(stats),
    }
}

/// Format bookmarks based on output format
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_bookmarks(bookmarks: &[SyncBookmark], format: OutputFormat) -> Result<String, OfflineError> {
    match format {
        OutputFormat::Pretty => Ok(format_bookmarks_pretty(bookmarks)),
        OutputFormat::Json => format_bookmarks_json(bookmarks),
    }
}
