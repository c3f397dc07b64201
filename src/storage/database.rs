//! `SQLite` database connection.
//!
//! The database is stored at `~/.offline-queue/queue.db` and holds the
//! operations queue and synchronization bookmarks. Hosts may keep their own
//! tables in the same file so their writes share the save-cycle transaction.

use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use crate::config::Paths;
use crate::error::OfflineError;

use super::migrations;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at the default location.
    ///
    /// Creates the database file and runs migrations if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open() -> Result<Self, OfflineError> {
        let paths = Paths::new()?;
        paths.ensure_dirs()?;
        Self::open_at(&paths.database)
    }

    /// Open the database at a specific path.
    ///
    /// Creates the database file and runs migrations if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_at(path: &Path) -> Result<Self, OfflineError> {
        let conn = Connection::open(path).map_err(|e| {
            OfflineError::Database(format!("Failed to open database {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "opened queue database");
        Self::init(conn)
    }

    /// Open an in-memory database (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_in_memory() -> Result<Self, OfflineError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            OfflineError::Database(format!("Failed to open in-memory database: {e}"))
        })?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, OfflineError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| OfflineError::Database(format!("Failed to enable foreign keys: {e}")))?;

        migrations::run(&conn)?;
        Ok(Self { conn })
    }

    /// Get the current schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> Result<i32, OfflineError> {
        migrations::get_version(&self.conn)
    }

    /// Get a reference to the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}
