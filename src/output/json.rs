//! JSON output formatting for offline-queue.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::OfflineError;
use crate::features::sync::{PendingOperation, QueueStats, SyncBookmark};

/// An operation with its snapshot decoded when it is valid JSON.
fn operation_value(op: &PendingOperation) -> Result<Value, OfflineError> {
    let mut value = serde_json::to_value(op)?;
    if let Ok(snapshot) = serde_json::from_str::<Value>(&op.snapshot) {
        value["snapshot"] = snapshot;
    }
    Ok(value)
}

/// Format queued operations as JSON
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_operations_json(operations: &[PendingOperation]) -> Result<String, OfflineError> {
    let items = operations
        .iter()
        .map(operation_value)
        .collect::<Result<Vec<_>, _>>()?;
    let output = json!({
        "count": operations.len(),
        "items": items
    });
    to_json(&output)
}

/// Format a single operation as JSON
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_operation_json(op: &PendingOperation) -> Result<String, OfflineError> {
    to_json(&operation_value(op)?)
}

/// Format queue statistics as JSON
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_stats_json(stats: &QueueStats) -> Result<String, OfflineError> {
    let output = json!({
        "add": stats.add,
        "replace": stats.replace,
        "delete": stats.delete,
        "total": stats.total(),
        "oldest": stats.oldest.map(|t: DateTime<Utc>| t.to_rfc3339()),
    });
    to_json(&output)
}

/// Format bookmarks as JSON
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_bookmarks_json(bookmarks: &[SyncBookmark]) -> Result<String, OfflineError> {
    let output = json!({
        "count": bookmarks.len(),
        "items": bookmarks
    });
    to_json(&output)
}

/// Serialize any value as pretty JSON
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, OfflineError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::sync::OperationKind;

    fn make_op(snapshot: &str) -> PendingOperation {
        PendingOperation::new(OperationKind::Add, "movie", "m1", snapshot.into(), Utc::now())
    }

    #[test]
    fn test_format_operations_json() {
        let ops = vec![make_op("{\"title\":\"Alien\"}")];
        let result = format_operations_json(&ops).unwrap();
        let parsed: Value = serde_json::from_str(&result).unwrap();

        assert_eq!(parsed["count"], 1);
        assert_eq!(parsed["items"][0]["operation_kind"], "add");
        assert_eq!(parsed["items"][0]["entity_id"], "m1");
        assert_eq!(parsed["items"][0]["snapshot"]["title"], "Alien");
    }

    #[test]
    fn test_non_json_snapshot_stays_a_string() {
        let result = format_operation_json(&make_op("<movie/>")).unwrap();
        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["snapshot"], "<movie/>");
    }

    #[test]
    fn test_format_stats_json() {
        let stats = QueueStats {
            add: 1,
            replace: 2,
            delete: 3,
            oldest: None,
        };
        let parsed: Value = serde_json::from_str(&format_stats_json(&stats).unwrap()).unwrap();
        assert_eq!(parsed["total"], 6);
        assert!(parsed["oldest"].is_null());
    }

    #[test]
    fn test_format_bookmarks_json() {
        let result = format_bookmarks_json(&[SyncBookmark::new("movies", 7)]).unwrap();
        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["items"][0]["table_name"], "movies");
        assert_eq!(parsed["items"][0]["last_synchronization_sequence"], 7);
    }
}
