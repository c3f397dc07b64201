//! Database migrations for offline-queue.
//!
//! Each migration is a function that upgrades the schema by one version.
//! Migrations are run automatically when the database is opened.

use rusqlite::Connection;

use crate::error::OfflineError;

/// Current schema version.
const CURRENT_VERSION: i32 = 1;

/// Get the current schema version from the database.
///
/// Returns 0 if no version has been set (new database).
pub fn get_version(conn: &Connection) -> Result<i32, OfflineError> {
    let version: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| OfflineError::Database(format!("Failed to get schema version: {e}")))?;

    Ok(version)
}

fn set_version(conn: &Connection, version: i32) -> Result<(), OfflineError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| OfflineError::Database(format!("Failed to set schema version: {e}")))
}

/// Run all pending migrations.
pub fn run(conn: &Connection) -> Result<(), OfflineError> {
    let current = get_version(conn)?;

    if current > CURRENT_VERSION {
        return Err(OfflineError::Database(format!(
            "Database schema version {current} is newer than supported version {CURRENT_VERSION}"
        )));
    }

    for version in (current + 1)..=CURRENT_VERSION {
        run_migration(conn, version)?;
        set_version(conn, version)?;
    }

    Ok(())
}

fn run_migration(conn: &Connection, version: i32) -> Result<(), OfflineError> {
    match version {
        1 => migrate_v1(conn),
        _ => Err(OfflineError::Database(format!(
            "Unknown migration version: {version}"
        ))),
    }
}

/// Migration v1: Initial schema.
///
/// Creates tables for:
/// - `operations_queue`: One pending operation per entity identity
/// - `synchronizations`: Last pulled sequence per remote table
fn migrate_v1(conn: &Connection) -> Result<(), OfflineError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS operations_queue (
            transaction_id TEXT PRIMARY KEY NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            operation_kind TEXT NOT NULL
                CHECK (operation_kind IN ('add', 'delete', 'replace')),
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            snapshot TEXT NOT NULL,
            UNIQUE (entity_type, entity_id)
        );

        CREATE INDEX IF NOT EXISTS idx_operations_queue_created
        ON operations_queue(created_at);

        CREATE TABLE IF NOT EXISTS synchronizations (
            table_name TEXT PRIMARY KEY NOT NULL,
            last_sequence INTEGER NOT NULL DEFAULT 0
        );
        ",
    )
    .map_err(|e| OfflineError::Database(format!("Migration v1 failed: {e}")))
}
