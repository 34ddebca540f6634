//! Database connection management
//!
//! Every store operation opens its own [`DatabaseConn`], does its work and
//! drops the connection before returning. No handle outlives a call.

use crate::error::{Result, SdohError};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// Core database connection wrapper
///
/// `DatabaseConn` provides a thin wrapper around SQLite connections,
/// handling file-based stores with consistent configuration.
pub struct DatabaseConn {
    pub conn: Connection,
}

impl DatabaseConn {
    /// Open the store at `path`, creating the file if it does not exist.
    ///
    /// Only the schema manager uses this; loaders go through [`Self::open_existing`].
    pub fn open_or_create(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = DatabaseConn { conn };
        db.configure()?;
        Ok(db)
    }

    /// Open an existing store without ever creating the file.
    pub fn open_existing(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SdohError::NotFound(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let db = DatabaseConn { conn };
        db.configure()?;
        Ok(db)
    }

    /// Configure the connection
    ///
    /// Foreign keys are left off: the `user_locations` references are declared
    /// but not enforced.
    fn configure(&self) -> Result<()> {
        let _: String = self
            .conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;

        self.conn.execute("PRAGMA synchronous=NORMAL", [])?;
        self.conn.execute("PRAGMA temp_store=MEMORY", [])?;
        // bundled SQLite defaults to enforcing them
        self.conn.execute("PRAGMA foreign_keys=OFF", [])?;

        Ok(())
    }

    /// Execute a SQL statement
    pub fn execute(&self, sql: &str) -> Result<usize> {
        Ok(self.conn.execute(sql, [])?)
    }

    /// Begin an unchecked transaction
    ///
    /// Dropping the returned transaction without calling `commit` rolls
    /// back every statement issued through it.
    pub fn transaction(&self) -> Result<rusqlite::Transaction<'_>> {
        Ok(self.conn.unchecked_transaction()?)
    }

    /// Check if a table exists in the database
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let count: i32 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get the row count for a table
    pub fn table_count(&self, table_name: &str) -> Result<u64> {
        let query = format!("SELECT COUNT(*) FROM {}", table_name);
        let count: u64 = self.conn.query_row(&query, [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_existing_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");

        let result = DatabaseConn::open_existing(&path);
        assert!(matches!(result, Err(SdohError::NotFound(p)) if p == path));
        // The guard must not leave a file behind
        assert!(!path.exists());
    }

    #[test]
    fn test_foreign_keys_not_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fk.db");

        let db = DatabaseConn::open_or_create(&path).unwrap();
        let fk: i64 = db
            .conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 0);
        drop(db);

        let db = DatabaseConn::open_existing(&path).unwrap();
        let fk: i64 = db
            .conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 0);
    }

    #[test]
    fn test_open_or_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.db");

        let db = DatabaseConn::open_or_create(&path);
        assert!(db.is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_table_exists() {
        let dir = tempfile::tempdir().unwrap();
        let db = DatabaseConn::open_or_create(&dir.path().join("t.db")).unwrap();
        db.execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();

        assert!(db.table_exists("test_table").unwrap());
        assert!(!db.table_exists("nonexistent_table").unwrap());
    }

    #[test]
    fn test_table_count() {
        let dir = tempfile::tempdir().unwrap();
        let db = DatabaseConn::open_or_create(&dir.path().join("t.db")).unwrap();
        db.execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();
        db.execute("INSERT INTO test_table (id) VALUES (1), (2), (3)")
            .unwrap();

        assert_eq!(db.table_count("test_table").unwrap(), 3);
    }

    #[test]
    fn test_transaction_rolls_back_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let db = DatabaseConn::open_or_create(&dir.path().join("t.db")).unwrap();
        db.execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();

        {
            let tx = db.transaction().unwrap();
            tx.execute("INSERT INTO test_table (id) VALUES (1)", [])
                .unwrap();
        }

        assert_eq!(db.table_count("test_table").unwrap(), 0);
    }
}
