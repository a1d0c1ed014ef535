//! Database handle trait.

use crate::Result;
use crate::models::{Record, Value};

/// Outcome of a statement that changes rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Rows inserted, updated or deleted.
    pub rows_affected: usize,
    /// Rowid of the most recent successful insert on the connection.
    pub last_insert_rowid: i64,
}

/// A forward-only, single-pass sequence of rows.
///
/// Only ever handed out inside a [`DatabaseHandle::with_rows`] scope. The
/// underlying statement is released when that scope ends, whether the
/// iterator was drained, abandoned, or [closed](RecordIter::close) early.
pub struct RecordIter<'a> {
    inner: Box<dyn Iterator<Item = Result<Record>> + 'a>,
}

impl<'a> RecordIter<'a> {
    /// Wraps a row iterator.
    pub fn new(inner: impl Iterator<Item = Result<Record>> + 'a) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    /// Stops iterating and releases the cursor.
    pub fn close(self) {
        drop(self);
    }
}

impl Iterator for RecordIter<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl std::fmt::Debug for RecordIter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordIter").finish_non_exhaustive()
    }
}

/// Trait for database handles a [`RecordStore`](crate::RecordStore) drives.
///
/// Implementations own their prepared statements: every method releases
/// the statement it prepared before returning, on success and on error.
/// Driver errors are returned unchanged in meaning; nothing is retried.
pub trait DatabaseHandle {
    /// Executes a statement that returns no rows.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<WriteOutcome>;

    /// Runs a query and hands its rows to `f` as a lazy iterator.
    ///
    /// The statement lives exactly as long as the call.
    fn with_rows<T, F>(&self, sql: &str, params: &[Value], f: F) -> Result<T>
    where
        F: FnOnce(RecordIter<'_>) -> Result<T>;

    /// Runs a query and collects every row.
    fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Record>> {
        self.with_rows(sql, params, |rows| rows.collect())
    }

    /// Runs a query and returns its first row, if any.
    fn fetch_row(&self, sql: &str, params: &[Value]) -> Result<Option<Record>> {
        self.with_rows(sql, params, |mut rows| rows.next().transpose())
    }

    /// Runs a query and returns the first column of its first row.
    ///
    /// Returns [`Value::Null`] when the query yields no rows.
    fn fetch_scalar(&self, sql: &str, params: &[Value]) -> Result<Value> {
        Ok(self
            .fetch_row(sql, params)?
            .and_then(|record| record.into_iter().next())
            .map_or(Value::Null, |(_, value)| value))
    }
}
