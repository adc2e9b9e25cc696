//! The [`Store`] contract and its SQLite implementation.
//!
//! [`SqliteStore`] owns exactly one connection for its whole lifetime. The
//! connection is opened in [`SqliteStore::open`] and closed either
//! explicitly with [`SqliteStore::close`] or when the store is dropped.
//! Every failing statement is logged with its SQL text before the
//! classified error is returned; nothing is retried or swallowed.
//!
//! # Example
//!
//! ```
//! use vitals_core::{ColumnSpec, FieldMap, OrderBy};
//! use vitals_sqlite::{SqliteStore, Store};
//!
//! let store = SqliteStore::open_in_memory().unwrap();
//! let columns = ColumnSpec::new()
//!     .column("id", "integer primary key autoincrement")
//!     .column("name", "text not null");
//! store.ensure_table("people", &columns).unwrap();
//!
//! store.insert("people", &FieldMap::new().with("name", "Ada")).unwrap();
//! store.insert("people", &FieldMap::new().with("name", "Alan")).unwrap();
//!
//! let rows = store
//!     .select("people", &FieldMap::new(), Some(&OrderBy::desc("name")))
//!     .unwrap();
//! assert_eq!(rows.len(), 2);
//!
//! let removed = store.delete("people", &FieldMap::new().with("name", "Ada")).unwrap();
//! assert_eq!(removed, 1);
//! store.close().unwrap();
//! ```

use std::path::Path;

use rusqlite::{Connection, params_from_iter, types::Value as SqlValue};
use tracing::{debug, error, info};
use vitals_core::{ColumnSpec, FieldMap, OrderBy, Row, Value};

use crate::convert;
use crate::error::{Result, StoreError};
use crate::statement::{self, Statement};

/// Structured persistence operations over a relational store.
///
/// Table and column names must come from trusted, fixed schemas; they are
/// validated as plain identifiers and interpolated. Values are always bound
/// as parameters, in the iteration order of the given [`FieldMap`].
pub trait Store {
    /// Creates the table if it does not exist yet.
    ///
    /// Calling this again for an existing table is a no-op, even when the
    /// column set differs.
    fn ensure_table(&self, table: &str, columns: &ColumnSpec) -> Result<()>;

    /// Drops the table; fails if it does not exist.
    fn drop_table(&self, table: &str) -> Result<()>;

    /// Inserts one row and returns its rowid.
    fn insert(&self, table: &str, fields: &FieldMap) -> Result<i64>;

    /// Returns every row matching all criteria; empty criteria match every row.
    fn select(&self, table: &str, criteria: &FieldMap, order: Option<&OrderBy>) -> Result<Vec<Row>>;

    /// Deletes every row matching all criteria and returns the affected count.
    ///
    /// Empty criteria are rejected with [`StoreError::EmptyCriteria`].
    fn delete(&self, table: &str, criteria: &FieldMap) -> Result<usize>;
}

/// A [`Store`] backed by a single SQLite connection.
pub struct SqliteStore {
    conn: Connection,
    location: String,
}

impl SqliteStore {
    /// Opens (or creates) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let location = path.display().to_string();
        info!(%location, "opened store");
        Ok(Self { conn, location })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn,
            location: ":memory:".to_string(),
        })
    }

    /// Where the database lives (`":memory:"` for in-memory stores).
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns `true` if a table with the given name exists.
    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Closes the connection, surfacing any error from SQLite.
    pub fn close(self) -> Result<()> {
        let location = self.location;
        self.conn.close().map_err(|(_, e)| StoreError::Database(e))?;
        info!(%location, "closed store");
        Ok(())
    }

    /// Number of rows in a table.
    pub fn count_rows(&self, table: &str) -> Result<i64> {
        let stmt = statement::count(table)?;
        let rows = self.query(&stmt)?;
        rows.first()
            .and_then(|row| row.first())
            .and_then(Value::as_i64)
            .ok_or_else(|| StoreError::Decode(format!("no count returned by `{}`", stmt.sql)))
    }

    fn failed(&self, stmt: &Statement, source: rusqlite::Error) -> StoreError {
        let err = StoreError::from_statement(&stmt.sql, source);
        error!(statement = %stmt.sql, error = %err, "statement failed");
        err
    }

    fn bind(stmt: &Statement) -> Vec<SqlValue> {
        stmt.params.iter().map(convert::to_sql).collect()
    }

    /// Runs a statement that takes no parameters and returns no rows.
    fn execute_ddl(&self, stmt: &Statement) -> Result<()> {
        debug!(statement = %stmt.sql, "executing");
        self.conn
            .execute(&stmt.sql, [])
            .map_err(|e| self.failed(stmt, e))?;
        Ok(())
    }

    /// Runs a data-modifying statement in its own transaction.
    ///
    /// Returns the affected row count and the last inserted rowid.
    fn execute_write(&self, stmt: &Statement) -> Result<(usize, i64)> {
        debug!(statement = %stmt.sql, params = stmt.params.len(), "executing");
        let params = Self::bind(stmt);
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| self.failed(stmt, e))?;
        let affected = tx
            .execute(&stmt.sql, params_from_iter(params.iter()))
            .map_err(|e| self.failed(stmt, e))?;
        let rowid = tx.last_insert_rowid();
        tx.commit().map_err(|e| self.failed(stmt, e))?;
        Ok((affected, rowid))
    }

    fn query(&self, stmt: &Statement) -> Result<Vec<Row>> {
        debug!(statement = %stmt.sql, params = stmt.params.len(), "executing");
        let params = Self::bind(stmt);
        let raw_rows =
            fetch_raw(&self.conn, &stmt.sql, &params).map_err(|e| self.failed(stmt, e))?;

        raw_rows.into_iter().map(convert::decode_row).collect()
    }
}

fn fetch_raw(conn: &Connection, sql: &str, params: &[SqlValue]) -> rusqlite::Result<Vec<Vec<SqlValue>>> {
    let mut prepared = conn.prepare(sql)?;
    let width = prepared.column_count();
    let mut rows = prepared.query(params_from_iter(params.iter()))?;
    let mut raw_rows = Vec::new();
    while let Some(row) = rows.next()? {
        raw_rows.push(convert::read_raw_row(row, width)?);
    }
    Ok(raw_rows)
}

impl Store for SqliteStore {
    fn ensure_table(&self, table: &str, columns: &ColumnSpec) -> Result<()> {
        let stmt = statement::create_table(table, columns)?;
        self.execute_ddl(&stmt)
    }

    fn drop_table(&self, table: &str) -> Result<()> {
        let stmt = statement::drop_table(table)?;
        self.execute_ddl(&stmt)
    }

    fn insert(&self, table: &str, fields: &FieldMap) -> Result<i64> {
        let stmt = statement::insert(table, fields)?;
        let (_, rowid) = self.execute_write(&stmt)?;
        Ok(rowid)
    }

    fn select(&self, table: &str, criteria: &FieldMap, order: Option<&OrderBy>) -> Result<Vec<Row>> {
        let stmt = statement::select(table, criteria, order)?;
        self.query(&stmt)
    }

    fn delete(&self, table: &str, criteria: &FieldMap) -> Result<usize> {
        let stmt = statement::delete(table, criteria)?;
        let (affected, _) = self.execute_write(&stmt)?;
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> ColumnSpec {
        ColumnSpec::new()
            .column("id", "integer primary key autoincrement")
            .column("name", "text not null")
    }

    #[test]
    fn test_open_in_memory() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.location(), ":memory:");
        assert!(!store.table_exists("people").unwrap());
    }

    #[test]
    fn test_ensure_table_creates_once() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.ensure_table("people", &people()).unwrap();
        store.ensure_table("people", &people()).unwrap();
        assert!(store.table_exists("people").unwrap());
    }

    #[test]
    fn test_insert_returns_rowid() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.ensure_table("people", &people()).unwrap();
        let first = store.insert("people", &FieldMap::new().with("name", "Ada")).unwrap();
        let second = store.insert("people", &FieldMap::new().with("name", "Alan")).unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[test]
    fn test_failed_insert_is_rolled_back() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.ensure_table("people", &people()).unwrap();
        let err = store
            .insert("people", &FieldMap::new().with("name", vitals_core::Value::Null))
            .unwrap_err();
        assert!(err.is_integrity());
        assert!(store.conn.is_autocommit());
        let rows = store.select("people", &FieldMap::new(), None).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_transaction_failure_carries_statement() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.ensure_table("people", &people()).unwrap();
        store.conn.execute_batch("BEGIN").unwrap();

        let err = store
            .insert("people", &FieldMap::new().with("name", "Ada"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Operational { .. }));
        assert_eq!(err.statement(), Some("INSERT INTO people (name) VALUES (?1)"));
    }

    #[test]
    fn test_count_rows() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.ensure_table("people", &people()).unwrap();
        assert_eq!(store.count_rows("people").unwrap(), 0);
        store.insert("people", &FieldMap::new().with("name", "Ada")).unwrap();
        assert_eq!(store.count_rows("people").unwrap(), 1);
        assert!(store.count_rows("people; --").unwrap_err().is_statement());
    }

    #[test]
    fn test_close() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.close().unwrap();
    }
}
