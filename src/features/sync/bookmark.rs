//! Synchronization bookmarks.
//!
//! One row per remote table, recording the last change sequence pulled from
//! it. Bookmarks are written by synchronization and never queued.

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::queue::OptionalExt;
use super::store::StoreError;
use crate::core::{Entity, Field};

/// Last synchronized sequence for a remote table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncBookmark {
    pub table_name: String,
    pub last_synchronization_sequence: i64,
}

impl SyncBookmark {
    /// Type name under which bookmarks would appear in a change stream.
    pub const ENTITY_TYPE: &'static str = "offline_synchronizations";

    #[must_use]
    pub fn new(table_name: impl Into<String>, last_synchronization_sequence: i64) -> Self {
        Self {
            table_name: table_name.into(),
            last_synchronization_sequence,
        }
    }
}

impl Entity for SyncBookmark {
    fn entity_type(&self) -> &'static str {
        Self::ENTITY_TYPE
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::key("table_name", self.table_name.clone()),
            Field::new("last_synchronization_sequence", self.last_synchronization_sequence),
        ]
    }
}

/// Get the bookmark for a table.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get(conn: &Connection, table_name: &str) -> Result<Option<SyncBookmark>, StoreError> {
    let bookmark = conn
        .query_row(
            "SELECT table_name, last_sequence FROM synchronizations WHERE table_name = ?1",
            [table_name],
            |row| {
                Ok(SyncBookmark {
                    table_name: row.get(0)?,
                    last_synchronization_sequence: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(bookmark)
}

/// Insert or overwrite the bookmark for a table.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn set(conn: &Connection, bookmark: &SyncBookmark) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO synchronizations (table_name, last_sequence) VALUES (?1, ?2)
         ON CONFLICT(table_name) DO UPDATE SET last_sequence = excluded.last_sequence",
        params![bookmark.table_name, bookmark.last_synchronization_sequence],
    )?;
    Ok(())
}

/// All bookmarks ordered by table name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list(conn: &Connection) -> Result<Vec<SyncBookmark>, StoreError> {
    let mut stmt =
        conn.prepare("SELECT table_name, last_sequence FROM synchronizations ORDER BY table_name")?;
    let rows = stmt.query_map([], |row| {
        Ok(SyncBookmark {
            table_name: row.get(0)?,
            last_synchronization_sequence: row.get(1)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
