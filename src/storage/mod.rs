//! Storage layer.
//!
//! - [`traits`]: the [`DatabaseHandle`] and [`PathResolver`] seams
//! - [`sqlite`]: the `SQLite` handle and the filter compiler
//! - [`RecordStore`]: CRUD over one table on top of both

// Dropping the connection guard slightly earlier buys nothing here.
#![allow(clippy::significant_drop_tightening)]

mod record_store;
mod resolver;
pub mod sqlite;
pub mod traits;

pub use record_store::RecordStore;
pub use resolver::FileResolver;
pub use sqlite::SqliteHandle;
pub use traits::{DatabaseHandle, DbLocation, PathResolver, RecordIter, WriteOutcome};
