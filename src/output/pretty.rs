use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};

use crate::features::sync::{OperationKind, PendingOperation, QueueStats, SyncBookmark};

fn kind_label(kind: OperationKind) -> ColoredString {
    let label = format!("{:<8}", kind.display_name());
    match kind {
        OperationKind::Add => label.green(),
        OperationKind::Replace => label.yellow(),
        OperationKind::Delete => label.red(),
        OperationKind::Unknown => label.dimmed(),
    }
}

/// Human-readable age of a timestamp.
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(then);
    if age.num_days() > 0 {
        format!("{} days ago", age.num_days())
    } else if age.num_hours() > 0 {
        format!("{} hours ago", age.num_hours())
    } else if age.num_minutes() > 0 {
        format!("{} minutes ago", age.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// Format queued operations as a table
pub fn format_operations_pretty(operations: &[PendingOperation], title: &str) -> String {
    if operations.is_empty() {
        return format!("{title} (0 operations)\n  Queue is empty");
    }

    let mut output = format!("{} ({} operations)\n", title, operations.len());
    output.push_str(&"─".repeat(80));
    output.push('\n');
    output.push_str(&format!(
        "{:<36}  {:<8}  {:<16}  {}\n",
        "Transaction", "Kind", "Updated", "Entity"
    ));
    output.push_str(&"─".repeat(80));
    output.push('\n');

    for op in operations {
        output.push_str(&format!(
            "{}  {}  {:<16}  {} {}\n",
            op.transaction_id.to_string().dimmed(),
            kind_label(op.operation_kind),
            op.updated_at.format("%Y-%m-%d %H:%M"),
            op.entity_type.cyan(),
            op.entity_id.bold()
        ));
    }

    output
}

/// Format a single operation with its snapshot
pub fn format_operation_pretty(op: &PendingOperation) -> String {
    let mut output = format!(
        "{} {} {}\n",
        kind_label(op.operation_kind),
        op.entity_type.cyan(),
        op.entity_id.bold()
    );
    output.push_str(&format!("  {}: {}\n", "Transaction".dimmed(), op.transaction_id));
    output.push_str(&format!(
        "  {}: {}\n",
        "Created".dimmed(),
        op.created_at.format("%Y-%m-%d %H:%M:%S%.3f")
    ));
    output.push_str(&format!(
        "  {}: {}\n",
        "Updated".dimmed(),
        op.updated_at.format("%Y-%m-%d %H:%M:%S%.3f")
    ));
    output.push_str(&format!("  {}:\n", "Snapshot".dimmed()));
    for line in op.snapshot.lines() {
        output.push_str(&format!("    {line}\n"));
    }

    output
}

/// Format queue statistics
pub fn format_stats_pretty(stats: &QueueStats, now: DateTime<Utc>) -> String {
    let mut lines = Vec::new();

    lines.push("Offline Queue Status".bold().to_string());
    lines.push("─".repeat(40));
    lines.push(format!("  Add:        {}", stats.add));
    lines.push(format!("  Replace:    {}", stats.replace));
    lines.push(format!("  Delete:     {}", stats.delete));
    lines.push(format!(
        "  Total:      {} {}",
        stats.total(),
        if stats.total() > 0 {
            "operations waiting".dimmed()
        } else {
            "".dimmed()
        }
    ));

    if let Some(oldest) = stats.oldest {
        lines.push(format!("  Oldest:     {}", format_age(oldest, now).dimmed()));
    }

    lines.join("\n")
}

/// Format synchronization bookmarks
pub fn format_bookmarks_pretty(bookmarks: &[SyncBookmark]) -> String {
    if bookmarks.is_empty() {
        return "Bookmarks (0)\n  No tables synchronized yet".to_string();
    }

    let mut output = format!("Bookmarks ({})\n", bookmarks.len());
    output.push_str(&"─".repeat(40));
    output.push('\n');
    for bookmark in bookmarks {
        output.push_str(&format!(
            "{:<28} {}\n",
            bookmark.table_name.bold(),
            bookmark.last_synchronization_sequence
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn make_op(kind: OperationKind, entity_id: &str) -> PendingOperation {
        PendingOperation::new(kind, "movie", entity_id, "{\"title\":\"Alien\"}".into(), Utc::now())
    }

    #[test]
    fn test_format_operations_pretty_empty() {
        let output = format_operations_pretty(&[], "Queue");
        assert!(output.contains("Queue (0 operations)"));
        assert!(output.contains("Queue is empty"));
    }

    #[test]
    fn test_format_operations_pretty_rows() {
        let ops = vec![make_op(OperationKind::Add, "m1"), make_op(OperationKind::Delete, "m2")];
        let output = format_operations_pretty(&ops, "Queue");

        assert!(output.contains("Queue (2 operations)"));
        assert!(output.contains(&ops[0].transaction_id.to_string()));
        assert!(output.contains("Add"));
        assert!(output.contains("Delete"));
        assert!(output.contains("m2"));
    }

    #[test]
    fn test_format_operation_pretty_includes_snapshot() {
        let op = make_op(OperationKind::Replace, "m1");
        let output = format_operation_pretty(&op);

        assert!(output.contains("Replace"));
        assert!(output.contains(&op.transaction_id.to_string()));
        assert!(output.contains("{\"title\":\"Alien\"}"));
    }

    #[test]
    fn test_format_stats_pretty() {
        let now = Utc::now();
        let stats = QueueStats {
            add: 2,
            replace: 1,
            delete: 0,
            oldest: Some(now - Duration::hours(3)),
        };
        let output = format_stats_pretty(&stats, now);

        assert!(output.contains("Add:        2"));
        assert!(output.contains("Total:      3"));
        assert!(output.contains("3 hours ago"));
    }

    #[test]
    fn test_format_stats_pretty_empty_has_no_oldest() {
        let output = format_stats_pretty(&QueueStats::default(), Utc::now());
        assert!(output.contains("Total:      0"));
        assert!(!output.contains("Oldest"));
    }

    #[test]
    fn test_format_age() {
        let now = Utc::now();
        assert_eq!(format_age(now, now), "just now");
        assert_eq!(format_age(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(format_age(now - Duration::days(2), now), "2 days ago");
    }

    #[test]
    fn test_format_bookmarks_pretty() {
        assert!(format_bookmarks_pretty(&[]).contains("No tables synchronized yet"));

        let output = format_bookmarks_pretty(&[SyncBookmark::new("movies", 42)]);
        assert!(output.contains("Bookmarks (1)"));
        assert!(output.contains("movies"));
        assert!(output.contains("42"));
    }
}
