//! Queue command implementation.
//!
//! Handles queue inspection and maintenance commands.

use uuid::Uuid;

use crate::cli::args::OutputFormat;
use crate::error::OfflineError;
use crate::features::sync::OfflineContext;
use crate::output::{format_bookmarks, format_operation, format_operations, format_stats, to_json};

/// Show queue statistics.
///
/// # Errors
///
/// Returns an error if the queue cannot be read.
pub fn status(ctx: &OfflineContext, format: OutputFormat) -> Result<String, OfflineError> {
    let stats = ctx.queue().stats()?;
    format_stats(&stats, format)
}

/// List queued operations.
///
/// # Errors
///
/// Returns an error if the queue cannot be read.
pub fn list(
    ctx: &OfflineContext,
    entity_type: Option<&str>,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<String, OfflineError> {
    let queue = ctx.queue();
    let (operations, title) = match entity_type {
        Some(entity_type) => {
            let mut operations = queue.by_entity_type(entity_type)?;
            if let Some(limit) = limit {
                operations.truncate(limit);
            }
            (operations, format!("Queued {entity_type}"))
        }
        None => (queue.pending(limit)?, "Queued".to_string()),
    };
    format_operations(&operations, &title, format)
}

/// Show one queued operation.
///
/// # Errors
///
/// Returns `OfflineError::NotFound` if no operation has this id.
pub fn show(ctx: &OfflineContext, id: Uuid, format: OutputFormat) -> Result<String, OfflineError> {
    let operation = ctx
        .queue()
        .get(id)?
        .ok_or_else(|| OfflineError::NotFound(format!("Operation {id}")))?;
    format_operation(&operation, format)
}

/// Remove one queued operation.
///
/// # Errors
///
/// Returns `OfflineError::NotFound` if no operation has this id.
pub fn remove(ctx: &OfflineContext, id: Uuid, format: OutputFormat) -> Result<String, OfflineError> {
    if !ctx.queue().remove(id)? {
        return Err(OfflineError::NotFound(format!("Operation {id}")));
    }

    match format {
        OutputFormat::Json => to_json(&serde_json::json!({ "removed": id })),
        OutputFormat::Pretty => Ok(format!("Removed operation {id}")),
    }
}

/// Remove every queued operation.
///
/// # Errors
///
/// Returns an error without `force`, or if the delete fails.
pub fn clear(ctx: &OfflineContext, force: bool, format: OutputFormat) -> Result<String, OfflineError> {
    if !force {
        return Err(OfflineError::Config(
            "Use --force to clear all operations".to_string(),
        ));
    }
    let count = ctx.queue().clear()?;

    match format {
        OutputFormat::Json => to_json(&serde_json::json!({ "cleared": count })),
        OutputFormat::Pretty => Ok(format!("Cleared {count} operations from queue")),
    }
}

/// List synchronization bookmarks.
///
/// # Errors
///
/// Returns an error if the bookmarks cannot be read.
pub fn bookmarks(ctx: &OfflineContext, format: OutputFormat) -> Result<String, OfflineError> {
    format_bookmarks(&ctx.bookmarks()?, format)
}
