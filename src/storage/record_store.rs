//! CRUD over a single table.
//!
//! [`RecordStore`] is the public surface of the crate. It compiles filters
//! and options with [`compile_filter`], assembles statements with
//! [`QueryBuilder`] and runs them through its [`DatabaseHandle`].
//!
//! # Identifiers
//!
//! `exists`, `read` and `remove` accept anything convertible into an
//! [`Identifier`]: a single key (`"u1"`, `42`, [`Value`]), a list of keys
//! (`Vec<Value>`), or a full [`Filter`].

use crate::config::{ConnectionSettings, StoreConfig};
use crate::models::{
    ConnectionUri, Filter, ID_COLUMN, Identifier, ListBinding, QueryOptions, Record, Value,
};
use crate::storage::resolver::FileResolver;
use crate::storage::sqlite::{QueryBuilder, SqliteHandle, compile_filter, record_operation_metrics};
use crate::storage::traits::{DatabaseHandle, DbLocation, PathResolver, RecordIter, WriteOutcome};
use crate::{Error, Result};
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Declarative CRUD access to one table.
///
/// The table name and list binding mode are fixed at construction. Table,
/// column and field names are quoted but never validated; they must come
/// from trusted code.
pub struct RecordStore<H = SqliteHandle> {
    handle: H,
    table: String,
    list_binding: ListBinding,
}

impl RecordStore<SqliteHandle> {
    /// Connects using a descriptor such as `sqlite://./app.db#users`.
    ///
    /// Relative paths resolve against the working directory and the
    /// connection uses default settings. Without a `#table` fragment the
    /// store targets `sqlite_master`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a malformed descriptor and
    /// [`Error::Connection`] if the database cannot be opened.
    pub fn connect(descriptor: &str) -> Result<Self> {
        let uri: ConnectionUri = descriptor.parse()?;
        Self::open(&uri, &FileResolver::default(), &ConnectionSettings::default())
    }

    /// Opens the database a parsed descriptor points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolver rejects the descriptor or the
    /// database cannot be opened.
    pub fn open(
        uri: &ConnectionUri,
        resolver: &impl PathResolver,
        settings: &ConnectionSettings,
    ) -> Result<Self> {
        let handle = match resolver.resolve(uri)? {
            DbLocation::Memory => SqliteHandle::in_memory(settings)?,
            DbLocation::File(path) => SqliteHandle::connect(path, settings)?,
        };
        Ok(Self::new(handle, uri.table()))
    }

    /// Opens the store described by a [`StoreConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if no database is configured, plus
    /// any error from [`open`](Self::open).
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let descriptor = config
            .database
            .as_deref()
            .ok_or_else(|| Error::InvalidInput("no database configured".to_string()))?;
        let uri: ConnectionUri = descriptor.parse()?;
        let resolver = FileResolver::new(config.base_dir.clone());
        Ok(Self::open(&uri, &resolver, &config.connection)?.with_list_binding(config.list_binding))
    }
}

impl<H: DatabaseHandle> RecordStore<H> {
    /// Wraps an existing handle.
    pub fn new(handle: H, table: impl Into<String>) -> Self {
        Self {
            handle,
            table: table.into(),
            list_binding: ListBinding::default(),
        }
    }

    /// Sets how `OneOf` constraints reach the database.
    ///
    /// [`ListBinding::Inline`] embeds escaped literals in the statement text
    /// and should only be used with trusted values.
    #[must_use]
    pub const fn with_list_binding(mut self, list_binding: ListBinding) -> Self {
        self.list_binding = list_binding;
        self
    }

    /// Returns the table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the underlying handle.
    #[must_use]
    pub const fn handle(&self) -> &H {
        &self.handle
    }

    /// Returns the list binding mode.
    #[must_use]
    pub const fn list_binding(&self) -> ListBinding {
        self.list_binding
    }

    /// Returns `true` if at least one row matches.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the query fails.
    #[instrument(skip(self, identifier), fields(operation = "exists", table = %self.table))]
    pub fn exists(&self, identifier: impl Into<Identifier>) -> Result<bool> {
        let filter = identifier.into().into_filter();
        self.observe("exists", || {
            let options = QueryOptions::new().fields([ID_COLUMN]).limit(1);
            Ok(!self.select(&filter, &options)?.is_empty())
        })
    }

    /// Reads the first matching row.
    ///
    /// A single key is looked up directly by `id`; keys and filters read
    /// the first row of a one-row `list`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the query fails.
    #[instrument(skip(self, identifier), fields(operation = "read", table = %self.table))]
    pub fn read(&self, identifier: impl Into<Identifier>) -> Result<Option<Record>> {
        let identifier = identifier.into();
        self.observe("read", || match identifier {
            Identifier::Key(key) => {
                let sql = QueryBuilder::new(&self.table).select_by_id();
                debug!(sql = %sql, "reading by id");
                self.handle.fetch_row(&sql, &[key])
            },
            other => {
                let options = QueryOptions::new().limit(1);
                Ok(self.select(&other.into_filter(), &options)?.into_iter().next())
            },
        })
    }

    /// Inserts the row, or updates the row keyed by `id` if it exists.
    ///
    /// With a falsy or absent `id` this is [`create`](Self::create).
    /// Otherwise the record is upserted on `id` in one statement (taking
    /// `id` from the argument when the record has none). On conflict only
    /// the columns present in the record are overwritten.
    ///
    /// The upsert needs a `PRIMARY KEY` or `UNIQUE` constraint on `id`.
    /// Without one, and when the record carries an `id` different from the
    /// argument (a rename), the write goes through
    /// [`write_checked`](Self::write_checked) instead, which is not atomic.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an empty record and
    /// [`Error::OperationFailed`] if the statement fails.
    #[instrument(skip(self, id, record), fields(operation = "write", table = %self.table, columns = record.len()))]
    pub fn write(&self, id: Option<Value>, mut record: Record) -> Result<WriteOutcome> {
        let Some(id) = id.filter(Value::is_truthy) else {
            return self.create(None, record);
        };
        self.observe("write", || {
            if record.get(ID_COLUMN).is_some_and(|own| *own != id) {
                debug!(key = %id, "record renames its id, writing by key");
                return self.write_checked(Some(id), record);
            }
            if !record.contains(ID_COLUMN) {
                record.insert(ID_COLUMN, id.clone());
            }

            let (columns, values) = record.clone().into_parts();
            let sql = QueryBuilder::new(&self.table).upsert(&columns)?;
            debug!(sql = %sql, params = values.len(), "upserting");
            match self.handle.execute(&sql, &values) {
                Err(e) if lacks_unique_id(&e) => {
                    debug!(error = %e, "no unique id constraint, writing by key");
                    self.write_checked(Some(id), record)
                },
                other => other,
            }
        })
    }

    /// Writes with a separate existence check.
    ///
    /// Calls [`exists`](Self::exists) and then either
    /// [`update`](Self::update) or [`create`](Self::create). The check and
    /// the write are separate statements, so a concurrent writer can insert
    /// the same `id` in between and make the create fail with a duplicate
    /// key. Prefer [`write`](Self::write).
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying operations.
    pub fn write_checked(&self, id: Option<Value>, record: Record) -> Result<WriteOutcome> {
        match id.filter(Value::is_truthy) {
            Some(id) if self.exists(id.clone())? => self.update(id, record),
            id => self.create(id, record),
        }
    }

    /// Inserts a new row.
    ///
    /// A truthy `id` is added to the record when it has no `id` column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an empty record (no SQL is
    /// issued) and [`Error::OperationFailed`] if the insert fails, e.g. on
    /// a duplicate key.
    #[instrument(skip(self, id, record), fields(operation = "create", table = %self.table, columns = record.len()))]
    pub fn create(&self, id: Option<Value>, mut record: Record) -> Result<WriteOutcome> {
        self.observe("create", || {
            if let Some(id) = id.filter(Value::is_truthy)
                && !record.contains(ID_COLUMN)
            {
                record.insert(ID_COLUMN, id);
            }
            let (columns, values) = record.into_parts();
            let sql = QueryBuilder::new(&self.table).insert(&columns)?;
            debug!(sql = %sql, params = values.len(), "inserting");
            self.handle.execute(&sql, &values)
        })
    }

    /// Overwrites the given columns of the row with this `id`.
    ///
    /// Columns absent from `record` keep their values. Updating a missing
    /// row is not an error; it affects zero rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an empty record and
    /// [`Error::OperationFailed`] if the statement fails.
    #[instrument(skip(self, id, record), fields(operation = "update", table = %self.table, columns = record.len()))]
    pub fn update(&self, id: impl Into<Value>, record: Record) -> Result<WriteOutcome> {
        let id = id.into();
        self.observe("update", || {
            let (columns, mut values) = record.into_parts();
            let sql = QueryBuilder::new(&self.table).update(&columns)?;
            values.push(id);
            debug!(sql = %sql, params = values.len(), "updating");
            self.handle.execute(&sql, &values)
        })
    }

    /// Deletes every matching row.
    ///
    /// An empty [`Filter`] deletes the whole table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the statement fails.
    #[instrument(skip(self, identifier), fields(operation = "remove", table = %self.table))]
    pub fn remove(&self, identifier: impl Into<Identifier>) -> Result<WriteOutcome> {
        let filter = identifier.into().into_filter();
        self.observe("remove", || {
            let compiled = compile_filter(&filter, &QueryOptions::default(), self.list_binding);
            let sql = QueryBuilder::new(&self.table).delete(&compiled);
            debug!(sql = %sql, params = compiled.values.len(), "deleting");
            self.handle.execute(&sql, &compiled.values)
        })
    }

    /// Returns every matching row, in result order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the query fails.
    #[instrument(skip(self, filter, options), fields(operation = "list", table = %self.table, predicates = filter.len()))]
    pub fn list(&self, filter: &Filter, options: &QueryOptions) -> Result<Vec<Record>> {
        self.observe("list", || self.select(filter, options))
    }

    /// Streams matching rows through `f`.
    ///
    /// The rows are read lazily and only once. The statement (and the
    /// connection lock) is held while `f` runs and released when it
    /// returns, however many rows it consumed.
    ///
    /// ```rust,ignore
    /// let first_two = store.iterate(&Filter::new(), &QueryOptions::new(), |rows| {
    ///     rows.take(2).collect::<litestore::Result<Vec<_>>>()
    /// })?;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the query fails, or whatever
    /// error `f` returns.
    #[instrument(skip(self, filter, options, f), fields(operation = "iterate", table = %self.table, predicates = filter.len()))]
    pub fn iterate<T, F>(&self, filter: &Filter, options: &QueryOptions, f: F) -> Result<T>
    where
        F: FnOnce(RecordIter<'_>) -> Result<T>,
    {
        self.observe("iterate", || {
            let compiled = compile_filter(filter, options, self.list_binding);
            let sql = QueryBuilder::new(&self.table).select(options.fields.as_deref(), &compiled);
            debug!(sql = %sql, params = compiled.values.len(), "iterating");
            self.handle.with_rows(&sql, &compiled.values, f)
        })
    }

    /// Counts every row matching `filter`.
    ///
    /// Only the filter is compiled. Projection, ordering and pagination in
    /// `options` are ignored, so the result is the total a paginated
    /// [`list`](Self::list) draws its pages from.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the query fails.
    #[instrument(skip(self, filter, _options), fields(operation = "count", table = %self.table, predicates = filter.len()))]
    pub fn count(&self, filter: &Filter, _options: &QueryOptions) -> Result<u64> {
        self.observe("count", || {
            let compiled = compile_filter(filter, &QueryOptions::default(), self.list_binding);
            let sql = QueryBuilder::new(&self.table).count(&compiled);
            debug!(sql = %sql, params = compiled.values.len(), "counting");

            let value = self.handle.fetch_scalar(&sql, &compiled.values)?;
            value
                .as_i64()
                .and_then(|n| u64::try_from(n).ok())
                .ok_or_else(|| Error::operation("count", format!("unexpected count value {value}")))
        })
    }

    fn select(&self, filter: &Filter, options: &QueryOptions) -> Result<Vec<Record>> {
        let compiled = compile_filter(filter, options, self.list_binding);
        let sql = QueryBuilder::new(&self.table).select(options.fields.as_deref(), &compiled);
        debug!(sql = %sql, params = compiled.values.len(), "selecting");
        self.handle.fetch_all(&sql, &compiled.values)
    }

    /// Times `f`, records metrics and tags driver errors with `operation`.
    fn observe<T>(&self, operation: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let start = Instant::now();
        let result = f().map_err(|e| match e {
            Error::OperationFailed {
                operation: step,
                cause,
            } if step != operation => Error::OperationFailed {
                operation: operation.to_string(),
                cause: format!("{step}: {cause}"),
            },
            other => other,
        });

        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics(operation, start, status);
        if let Err(e) = &result {
            warn!(operation, table = %self.table, error = %e, "record store operation failed");
        }
        result
    }
}

/// `true` when an upsert failed because `id` has no unique constraint.
fn lacks_unique_id(error: &Error) -> bool {
    matches!(error, Error::OperationFailed { cause, .. }
        if cause.contains("ON CONFLICT clause does not match"))
}

impl<H> std::fmt::Debug for RecordStore<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("table", &self.table)
            .field("list_binding", &self.list_binding)
            .finish_non_exhaustive()
    }
}
