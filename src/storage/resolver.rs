//! Filesystem descriptor resolution.

use crate::models::ConnectionUri;
use crate::storage::traits::{DbLocation, PathResolver};
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Resolves descriptor paths against a base directory.
///
/// - `:memory:` resolves to [`DbLocation::Memory`]
/// - `~/rest` expands to the current user's home directory
/// - absolute paths are used as-is
/// - anything else is joined onto `base_dir`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResolver {
    base_dir: PathBuf,
}

impl FileResolver {
    /// Creates a resolver rooted at `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Returns the base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl Default for FileResolver {
    fn default() -> Self {
        Self::new(".")
    }
}

impl PathResolver for FileResolver {
    fn resolve(&self, uri: &ConnectionUri) -> Result<DbLocation> {
        if uri.is_memory() {
            return Ok(DbLocation::Memory);
        }

        let raw = uri.path();
        if let Some(rest) = raw.strip_prefix("~/") {
            let home = directories::BaseDirs::new()
                .map(|dirs| dirs.home_dir().to_path_buf())
                .ok_or_else(|| {
                    Error::InvalidInput(format!("cannot expand '{raw}': no home directory"))
                })?;
            return Ok(DbLocation::File(home.join(rest)));
        }

        let path = Path::new(raw);
        if path.is_absolute() {
            Ok(DbLocation::File(path.to_path_buf()))
        } else {
            Ok(DbLocation::File(self.base_dir.join(path)))
        }
    }
}
