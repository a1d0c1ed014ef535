//! Connection descriptor resolution trait.

use crate::Result;
use crate::models::ConnectionUri;
use std::path::PathBuf;

/// Where a database lives once a descriptor has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    /// A private in-memory database.
    Memory,
    /// A database file.
    File(PathBuf),
}

/// Maps connection descriptors to database locations.
pub trait PathResolver {
    /// Resolves the path component of `uri`.
    fn resolve(&self, uri: &ConnectionUri) -> Result<DbLocation>;
}
