//! # Litestore
//!
//! Declarative CRUD over a single `SQLite` table.
//!
//! Callers describe *which* rows they want with a [`Filter`] and *how* they
//! want them with [`QueryOptions`]; the filter compiler turns both into a
//! parameterized `WHERE` / `ORDER BY` / `LIMIT` / `OFFSET` clause and the
//! [`RecordStore`] executes it against its table.
//!
//! ## Features
//!
//! - `exists`, `read`, `write`, `create`, `update`, `remove`, `list`,
//!   `iterate` and `count` against one table
//! - Equality, set membership and `LIKE` predicates from a tagged [`Constraint`]
//! - Field projection, multi-column ordering and pagination
//! - Atomic upsert for `write`
//! - Scoped lazy iteration that always releases its statement
//!
//! ## Example
//!
//! ```rust,ignore
//! use litestore::{Filter, QueryOptions, Record, RecordStore};
//!
//! let store = RecordStore::connect("sqlite://./app.db#users")?;
//! store.create(None, Record::from([("id", "u1".into()), ("name", "Ada".into())]))?;
//!
//! let admins = store.list(
//!     &Filter::new().one_of("role", ["admin", "owner"]),
//!     &QueryOptions::new().order_asc("name").limit(10),
//! )?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod models;
pub mod observability;
pub mod storage;

// Re-exports for convenience
pub use config::{ConnectionSettings, StoreConfig};
pub use models::{
    ConnectionUri, Constraint, Filter, Identifier, ListBinding, Pattern, QueryOptions, Record,
    Value,
};
pub use storage::{
    DatabaseHandle, DbLocation, FileResolver, PathResolver, RecordIter, RecordStore, SqliteHandle,
    WriteOutcome,
};

/// Error type for litestore operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `Connection` | The database file cannot be opened or configured |
/// | `InvalidInput` | Empty records, malformed descriptors or pattern literals |
/// | `OperationFailed` | The driver rejects or fails to execute a statement |
/// | `Config` | A configuration file cannot be read or parsed |
#[derive(Debug, ThisError)]
pub enum Error {
    /// The underlying store could not be opened.
    ///
    /// Fatal to the handle that raised it; a new handle must be connected.
    #[error("cannot connect to '{path}': {cause}")]
    Connection {
        /// The path or descriptor that was being opened.
        path: String,
        /// The underlying cause.
        cause: String,
    },

    /// Invalid input was provided.
    ///
    /// Raised before any SQL is issued when:
    /// - `create` or `update` receives a record with no columns
    /// - A connection descriptor has an empty path
    /// - A delimited pattern literal is missing a delimiter
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Driver errors are carried here unchanged; nothing is retried.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Builds an [`Error::OperationFailed`] from any displayable cause.
    pub fn operation(operation: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for litestore operations.
pub type Result<T> = std::result::Result<T, Error>;
