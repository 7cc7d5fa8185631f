use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::debug;

use crate::Result;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database operation failed: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Named-list storage over SQLite
///
/// SQLite was chosen because:
/// - Zero-config embedded database
/// - Battle-tested and reliable
/// - Doesn't require a separate process
///
/// One row per list: the whole serialized collection is the write
/// granularity, matching how lists are saved and loaded upstream.
pub struct ListDb {
    conn: Connection,
}

impl ListDb {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        // Initialize schema on first run
        Self::init_schema(&conn)?;

        Ok(Self { conn })
    }

    /// In-memory database, handy for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS lists (
                name TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                saved_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Write a list payload, replacing any previous version of the name
    /// in a single statement.
    pub fn put(&self, name: &str, payload: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO lists (name, payload, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET payload = ?2, saved_at = ?3",
            params![name, payload, Utc::now().timestamp()],
        )?;
        debug!("Stored list '{}' ({} bytes)", name, payload.len());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM lists WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(payload)
    }

    /// All stored list names, in no particular order
    pub fn names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM lists")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut names = Vec::new();
        for name in rows {
            names.push(name?);
        }
        Ok(names)
    }

    /// Delete a list. Removing a name that was never stored is fine.
    pub fn remove(&self, name: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM lists WHERE name = ?1", params![name])?;
        Ok(())
    }
}
