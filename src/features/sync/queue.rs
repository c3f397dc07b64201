//! `SQLite` queue storage and inspection.
//!
//! Works over any borrowed connection, so the same store serves plain reads
//! and writes issued inside a save-cycle transaction.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, Row};
use serde::Serialize;
use uuid::Uuid;

use super::operation::{OperationKind, PendingOperation};
use super::store::{QueueStore, StoreError};

const COLUMNS: &str = "transaction_id, created_at, updated_at, operation_kind, \
                       entity_type, entity_id, snapshot";

/// Queue rows in the `operations_queue` table.
#[derive(Clone, Copy)]
pub struct SqliteQueueStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteQueueStore<'c> {
    /// Create a store over an open connection or transaction.
    #[must_use]
    pub const fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Get a row by transaction id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed.
    pub fn get(&self, transaction_id: Uuid) -> Result<Option<PendingOperation>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM operations_queue WHERE transaction_id = ?1");
        let row = self
            .conn
            .query_row(&sql, [transaction_id.to_string()], row_to_operation)
            .optional()?;
        Ok(row)
    }

    /// Get queued rows in replay order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn pending(&self, limit: Option<usize>) -> Result<Vec<PendingOperation>, StoreError> {
        let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
        let sql = format!(
            "SELECT {COLUMNS} FROM operations_queue
             ORDER BY created_at ASC, transaction_id ASC
             LIMIT ?1"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([limit], row_to_operation)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Get queued rows for one entity type, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn by_entity_type(&self, entity_type: &str) -> Result<Vec<PendingOperation>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM operations_queue
             WHERE entity_type = ?1
             ORDER BY created_at ASC, transaction_id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([entity_type], row_to_operation)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Number of queued rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM operations_queue", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Get queue statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn stats(&self) -> Result<QueueStats, StoreError> {
        let mut stats = QueueStats::default();

        let mut stmt = self.conn.prepare(
            "SELECT operation_kind, COUNT(*) FROM operations_queue GROUP BY operation_kind",
        )?;
        let counts = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for entry in counts {
            let (kind, count) = entry?;
            let count = usize::try_from(count).unwrap_or_default();
            match OperationKind::parse(&kind) {
                Some(OperationKind::Add) => stats.add = count,
                Some(OperationKind::Replace) => stats.replace = count,
                Some(OperationKind::Delete) => stats.delete = count,
                _ => return Err(StoreError::InvalidRow(format!("operation kind '{kind}'"))),
            }
        }

        let oldest: Option<String> = self
            .conn
            .query_row(
                "SELECT created_at FROM operations_queue ORDER BY created_at ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        stats.oldest = oldest
            .map(|s| parse_timestamp(&s).map_err(|e| StoreError::InvalidRow(e.to_string())))
            .transpose()?;

        Ok(stats)
    }

    /// Remove a row. Returns whether anything was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn remove(&self, transaction_id: Uuid) -> Result<bool, StoreError> {
        let rows = self.conn.execute(
            "DELETE FROM operations_queue WHERE transaction_id = ?1",
            [transaction_id.to_string()],
        )?;
        Ok(rows > 0)
    }

    /// Remove every queued row. Returns the number deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn clear(&self) -> Result<usize, StoreError> {
        Ok(self.conn.execute("DELETE FROM operations_queue", [])?)
    }
}

impl QueueStore for SqliteQueueStore<'_> {
    fn find(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Option<PendingOperation>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM operations_queue WHERE entity_type = ?1 AND entity_id = ?2"
        );
        let row = self
            .conn
            .query_row(&sql, [entity_type, entity_id], row_to_operation)
            .optional()?;
        Ok(row)
    }

    fn insert(&self, operation: &PendingOperation) -> Result<(), StoreError> {
        if !operation.operation_kind.is_persistable() {
            return Err(StoreError::InvalidRow(format!(
                "refusing to store {} with operation kind {}",
                operation.transaction_id, operation.operation_kind
            )));
        }

        let sql = format!("INSERT INTO operations_queue ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)");
        self.conn
            .execute(
                &sql,
                params![
                    operation.transaction_id.to_string(),
                    format_timestamp(operation.created_at),
                    format_timestamp(operation.updated_at),
                    operation.operation_kind.as_str(),
                    operation.entity_type,
                    operation.entity_id,
                    operation.snapshot,
                ],
            )
            .map_err(|e| match e.sqlite_error_code() {
                Some(ErrorCode::ConstraintViolation) => StoreError::Duplicate {
                    entity_type: operation.entity_type.clone(),
                    entity_id: operation.entity_id.clone(),
                },
                _ => StoreError::Sqlite(e),
            })?;
        Ok(())
    }

    fn update(&self, operation: &PendingOperation) -> Result<(), StoreError> {
        if !operation.operation_kind.is_persistable() {
            return Err(StoreError::InvalidRow(format!(
                "refusing to store {} with operation kind {}",
                operation.transaction_id, operation.operation_kind
            )));
        }

        let rows = self.conn.execute(
            "UPDATE operations_queue SET
               updated_at = ?1,
               operation_kind = ?2,
               snapshot = ?3
             WHERE transaction_id = ?4",
            params![
                format_timestamp(operation.updated_at),
                operation.operation_kind.as_str(),
                operation.snapshot,
                operation.transaction_id.to_string(),
            ],
        )?;
        if rows == 0 {
            return Err(StoreError::Missing(operation.transaction_id));
        }
        Ok(())
    }

    fn delete(&self, transaction_id: Uuid) -> Result<(), StoreError> {
        if self.remove(transaction_id)? {
            Ok(())
        } else {
            Err(StoreError::Missing(transaction_id))
        }
    }
}

/// Queue statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    /// Number of queued adds
    pub add: usize,
    /// Number of queued replaces
    pub replace: usize,
    /// Number of queued deletes
    pub delete: usize,
    /// Oldest queued row
    pub oldest: Option<DateTime<Utc>>,
}

impl QueueStats {
    /// Total number of queued rows.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.add + self.replace + self.delete
    }
}

/// Storage representation of a timestamp.
pub(crate) fn format_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|t| t.with_timezone(&Utc))
}

fn conversion_error<E>(column: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e))
}

fn row_to_operation(row: &Row<'_>) -> Result<PendingOperation, rusqlite::Error> {
    let transaction_id: String = row.get(0)?;
    let created_at: String = row.get(1)?;
    let updated_at: String = row.get(2)?;
    let operation_kind: String = row.get(3)?;

    let operation_kind = OperationKind::parse(&operation_kind).ok_or_else(|| {
        conversion_error(3, StoreError::InvalidRow(format!("operation kind '{operation_kind}'")))
    })?;

    Ok(PendingOperation {
        transaction_id: Uuid::parse_str(&transaction_id).map_err(|e| conversion_error(0, e))?,
        created_at: parse_timestamp(&created_at).map_err(|e| conversion_error(1, e))?,
        updated_at: parse_timestamp(&updated_at).map_err(|e| conversion_error(2, e))?,
        operation_kind,
        entity_type: row.get(4)?,
        entity_id: row.get(5)?,
        snapshot: row.get(6)?,
    })
}

pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
