//! Data models for litestore.
//!
//! Filters, options and records are transient values built per call; none of
//! them is cached or persisted by the store.

mod filter;
mod options;
mod record;
mod uri;
mod value;

pub use filter::{Constraint, Filter, ID_COLUMN, Identifier, Pattern};
pub use options::{ASC, DESC, ListBinding, QueryOptions};
pub use record::Record;
pub use uri::{ConnectionUri, DEFAULT_TABLE, MEMORY_PATH};
pub use value::Value;
