//! Storage traits.
//!
//! The record store talks to the database only through [`DatabaseHandle`],
//! and turns descriptors into locations only through [`PathResolver`].

mod handle;
mod resolver;

pub use handle::{DatabaseHandle, RecordIter, WriteOutcome};
pub use resolver::{DbLocation, PathResolver};
