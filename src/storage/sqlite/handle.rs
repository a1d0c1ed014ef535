//! `SQLite` implementation of [`DatabaseHandle`].

use super::connection::{acquire_lock, configure_connection};
use super::row::record_from_row;
use crate::config::ConnectionSettings;
use crate::models::{Record, Value};
use crate::storage::traits::{DatabaseHandle, RecordIter, WriteOutcome};
use crate::{Error, Result};
use rusqlite::{Connection, Rows, params_from_iter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, instrument};

/// `SQLite` database handle.
///
/// # Concurrency Model
///
/// Uses a `Mutex<Connection>` because `rusqlite::Connection` is not `Sync`.
/// The lock is held for one statement (or one [`with_rows`] scope), so
/// callers sharing a handle across threads are serialised here.
///
/// [`with_rows`]: DatabaseHandle::with_rows
pub struct SqliteHandle {
    conn: Mutex<Connection>,
    /// Path to the database file (None for in-memory).
    db_path: Option<PathBuf>,
}

impl SqliteHandle {
    /// Opens (creating if needed) a database file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the file cannot be opened or
    /// configured.
    #[instrument(skip(path, settings), fields(path = %path.as_ref().display()))]
    pub fn connect(path: impl AsRef<Path>, settings: &ConnectionSettings) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let conn = Connection::open(&db_path).map_err(|e| Error::Connection {
            path: db_path.display().to_string(),
            cause: e.to_string(),
        })?;
        configure_connection(&conn, settings)?;
        debug!("opened sqlite database");

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path),
        })
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the database cannot be created.
    pub fn in_memory(settings: &ConnectionSettings) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::Connection {
            path: ":memory:".to_string(),
            cause: e.to_string(),
        })?;
        configure_connection(&conn, settings)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    /// Wraps an already-open connection as-is.
    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        let db_path = conn
            .path()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        Self {
            conn: Mutex::new(conn),
            db_path,
        }
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub const fn db_path(&self) -> Option<&PathBuf> {
        self.db_path.as_ref()
    }

    /// Runs a batch of SQL with no parameters, e.g. schema setup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if any statement fails.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let conn = acquire_lock(&self.conn);
        conn.execute_batch(sql)
            .map_err(|e| Error::operation("execute_batch", e))
    }
}

impl std::fmt::Debug for SqliteHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteHandle")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl DatabaseHandle for SqliteHandle {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<WriteOutcome> {
        let conn = acquire_lock(&self.conn);
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| Error::operation("prepare", e))?;
        let rows_affected = stmt
            .execute(params_from_iter(params))
            .map_err(|e| Error::operation("execute", e))?;

        Ok(WriteOutcome {
            rows_affected,
            last_insert_rowid: conn.last_insert_rowid(),
        })
    }

    fn with_rows<T, F>(&self, sql: &str, params: &[Value], f: F) -> Result<T>
    where
        F: FnOnce(RecordIter<'_>) -> Result<T>,
    {
        let conn = acquire_lock(&self.conn);
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| Error::operation("prepare", e))?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let rows = stmt
            .query(params_from_iter(params))
            .map_err(|e| Error::operation("query", e))?;

        f(RecordIter::new(RowCursor {
            rows,
            columns,
            finished: false,
        }))
    }
}

/// Adapts driver rows to an [`Iterator`] of records.
struct RowCursor<'stmt> {
    rows: Rows<'stmt>,
    columns: Vec<String>,
    finished: bool,
}

impl Iterator for RowCursor<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.rows.next() {
            Ok(Some(row)) => Some(record_from_row(row, &self.columns)),
            Ok(None) => {
                self.finished = true;
                None
            },
            Err(e) => {
                self.finished = true;
                Some(Err(Error::operation("read_row", e)))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle_with_rows() -> SqliteHandle {
        let handle = SqliteHandle::in_memory(&ConnectionSettings::default()).unwrap();
        handle
            .execute_batch(
                "CREATE TABLE t (id TEXT PRIMARY KEY, n INTEGER);
                 INSERT INTO t VALUES ('a', 1), ('b', 2), ('c', 3);",
            )
            .unwrap();
        handle
    }

    #[test]
    fn test_fetch_all_and_row() {
        let handle = handle_with_rows();

        let rows = handle
            .fetch_all("SELECT * FROM t ORDER BY id", &[])
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get("id"), Some(&Value::from("a")));

        let row = handle
            .fetch_row("SELECT n FROM t WHERE id=?", &[Value::from("b")])
            .unwrap();
        assert_eq!(row.unwrap().get("n"), Some(&Value::Integer(2)));

        let none = handle
            .fetch_row("SELECT n FROM t WHERE id=?", &[Value::from("z")])
            .unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_fetch_scalar() {
        let handle = handle_with_rows();
        let count = handle.fetch_scalar("SELECT count(*) FROM t", &[]).unwrap();
        assert_eq!(count, Value::Integer(3));

        let empty = handle
            .fetch_scalar("SELECT n FROM t WHERE id='zz'", &[])
            .unwrap();
        assert_eq!(empty, Value::Null);
    }

    #[test]
    fn test_execute_reports_outcome() {
        let handle = handle_with_rows();
        let outcome = handle
            .execute("UPDATE t SET n = n + 1 WHERE n > ?", &[Value::Integer(1)])
            .unwrap();
        assert_eq!(outcome.rows_affected, 2);
    }

    #[test]
    fn test_with_rows_early_exit_releases_lock() {
        let handle = handle_with_rows();
        let first = handle
            .with_rows("SELECT id FROM t ORDER BY id", &[], |mut rows| {
                rows.next().transpose()
            })
            .unwrap();
        assert_eq!(first.unwrap().get("id"), Some(&Value::from("a")));

        // The statement and lock are gone, so writes go through.
        handle.execute("DELETE FROM t", &[]).unwrap();
        assert_eq!(
            handle.fetch_scalar("SELECT count(*) FROM t", &[]).unwrap(),
            Value::Integer(0)
        );
    }

    #[test]
    fn test_errors_are_operation_failed() {
        let handle = handle_with_rows();
        let err = handle.fetch_all("SELECT * FROM missing", &[]).unwrap_err();
        assert!(matches!(err, Error::OperationFailed { ref operation, .. } if operation == "prepare"));

        let err = handle
            .execute("INSERT INTO t (id, n) VALUES ('a', 9)", &[])
            .unwrap_err();
        assert!(matches!(err, Error::OperationFailed { ref operation, .. } if operation == "execute"));
    }

    #[test]
    fn test_connect_file_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("handle.db");
        {
            let handle = SqliteHandle::connect(&path, &ConnectionSettings::default()).unwrap();
            assert_eq!(handle.db_path(), Some(&path));
            handle
                .execute_batch("CREATE TABLE k (id INTEGER PRIMARY KEY); INSERT INTO k VALUES (1);")
                .unwrap();
        }
        let handle = SqliteHandle::connect(&path, &ConnectionSettings::default()).unwrap();
        assert_eq!(
            handle.fetch_scalar("SELECT count(*) FROM k", &[]).unwrap(),
            Value::Integer(1)
        );
    }

    #[test]
    fn test_connect_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("nested").join("x.db");
        let err = SqliteHandle::connect(&path, &ConnectionSettings::default()).unwrap_err();
        assert!(matches!(err, Error::Connection { .. }));
    }
}
