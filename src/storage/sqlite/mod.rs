//! `SQLite` infrastructure for the record store.
//!
//! ## Module Structure
//!
//! - `connection`: lock acquisition and connection configuration
//! - `sql`: filter compilation, identifier quoting, literal escaping
//! - `query`: statement text for each store operation
//! - `row`: conversion between driver values and [`Value`](crate::models::Value)
//! - `metrics`: operation metrics helpers
//! - `handle`: the [`SqliteHandle`] itself

mod connection;
mod handle;
mod metrics;
mod query;
mod row;
mod sql;

pub use connection::{acquire_lock, configure_connection};
pub use handle::SqliteHandle;
pub use metrics::record_operation_metrics;
pub use query::QueryBuilder;
pub use row::record_from_row;
pub use sql::{
    CompiledFilter, UNLIMITED, compile_filter, escape_value, pagination_clause, quote_identifier,
};
