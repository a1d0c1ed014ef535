//! Connection descriptors.
//!
//! A descriptor names a database file and, optionally, the table a store
//! operates on:
//!
//! ```text
//! [sqlite://]{path}[#{table}]
//! ```
//!
//! Where:
//! - `path`: filesystem path, or `:memory:` for an in-memory database
//! - `table`: target table; defaults to `sqlite_master` when absent
//!
//! # Examples
//!
//! ```
//! use litestore::ConnectionUri;
//!
//! let uri = ConnectionUri::parse("sqlite://./data/app.db#users").unwrap();
//! assert_eq!(uri.path(), "./data/app.db");
//! assert_eq!(uri.table(), "users");
//!
//! let uri = ConnectionUri::parse("sqlite::memory:").unwrap();
//! assert!(uri.is_memory());
//! assert_eq!(uri.table(), "sqlite_master");
//! ```

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Table used when a descriptor has no fragment.
pub const DEFAULT_TABLE: &str = "sqlite_master";

/// Path that selects an in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

const SCHEME: &str = "sqlite:";

/// A parsed connection descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionUri {
    path: String,
    table: Option<String>,
}

impl ConnectionUri {
    /// Parses a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the path component is empty.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let rest = trimmed
            .strip_prefix("sqlite://")
            .or_else(|| trimmed.strip_prefix(SCHEME))
            .unwrap_or(trimmed);

        let (path, table) = match rest.rsplit_once('#') {
            Some((path, fragment)) => (path, Some(fragment)),
            None => (rest, None),
        };

        if path.is_empty() {
            return Err(Error::InvalidInput(format!(
                "connection descriptor has no path: {s}"
            )));
        }

        Ok(Self {
            path: path.to_string(),
            table: table.filter(|t| !t.is_empty()).map(str::to_string),
        })
    }

    /// Creates a descriptor for an in-memory database.
    #[must_use]
    pub fn memory(table: Option<&str>) -> Self {
        Self {
            path: MEMORY_PATH.to_string(),
            table: table.filter(|t| !t.is_empty()).map(str::to_string),
        }
    }

    /// The path component as written.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The table fragment, or [`DEFAULT_TABLE`].
    #[must_use]
    pub fn table(&self) -> &str {
        self.table.as_deref().unwrap_or(DEFAULT_TABLE)
    }

    /// Returns `true` if the fragment was given explicitly.
    #[must_use]
    pub const fn has_table(&self) -> bool {
        self.table.is_some()
    }

    /// Returns `true` for `:memory:`.
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.path == MEMORY_PATH
    }
}

impl FromStr for ConnectionUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ConnectionUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sqlite://{}", self.path)?;
        if let Some(table) = &self.table {
            write!(f, "#{table}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("sqlite://./app.db#users", "./app.db", "users" ; "scheme and fragment")]
    #[test_case("sqlite:///var/lib/app.db", "/var/lib/app.db", "sqlite_master" ; "absolute path")]
    #[test_case("app.db#", "app.db", "sqlite_master" ; "empty fragment")]
    #[test_case("data/app.db#t#x", "data/app.db#t", "x" ; "last hash wins")]
    #[test_case("sqlite::memory:#kv", ":memory:", "kv" ; "memory shorthand")]
    fn test_parse(input: &str, path: &str, table: &str) {
        let uri = ConnectionUri::parse(input).unwrap();
        assert_eq!(uri.path(), path);
        assert_eq!(uri.table(), table);
    }

    #[test]
    fn test_parse_empty_path() {
        assert!(matches!(
            ConnectionUri::parse("sqlite://#users"),
            Err(Error::InvalidInput(_))
        ));
        assert!(ConnectionUri::parse("").is_err());
    }

    #[test]
    fn test_display() {
        let uri: ConnectionUri = "./app.db#users".parse().unwrap();
        assert_eq!(uri.to_string(), "sqlite://./app.db#users");
        assert_eq!(ConnectionUri::parse(&uri.to_string()).unwrap(), uri);
        assert_eq!(ConnectionUri::memory(None).to_string(), "sqlite://:memory:");
    }

    #[test]
    fn test_memory() {
        assert!(ConnectionUri::parse(":memory:").unwrap().is_memory());
        assert!(!ConnectionUri::parse("memory.db").unwrap().is_memory());
        assert!(!ConnectionUri::memory(Some("")).has_table());
    }
}
