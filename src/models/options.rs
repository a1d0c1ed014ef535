//! Projection, ordering and pagination options.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ascending sort direction.
pub const ASC: i64 = 1;
/// Descending sort direction.
pub const DESC: i64 = -1;

/// Query options applied after filtering.
///
/// Order entries carry a raw direction: [`ASC`] (`1`) or [`DESC`] (`-1`).
/// Any other direction is ignored when the query is compiled. A `limit` or
/// `offset` of zero counts as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Columns to project; `None` projects `*`.
    pub fields: Option<Vec<String>>,
    /// `(field, direction)` pairs in clause order.
    pub order: Vec<(String, i64)>,
    /// Maximum number of rows.
    pub limit: Option<u64>,
    /// Rows to skip.
    pub offset: Option<u64>,
}

impl QueryOptions {
    /// Creates options with nothing set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: None,
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Projects only the given columns.
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Appends an order entry with a raw direction.
    #[must_use]
    pub fn order(mut self, field: impl Into<String>, direction: i64) -> Self {
        self.order.push((field.into(), direction));
        self
    }

    /// Appends an ascending order entry.
    #[must_use]
    pub fn order_asc(self, field: impl Into<String>) -> Self {
        self.order(field, ASC)
    }

    /// Appends a descending order entry.
    #[must_use]
    pub fn order_desc(self, field: impl Into<String>) -> Self {
        self.order(field, DESC)
    }

    /// Caps the number of returned rows.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips rows.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// How `OneOf` values reach the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListBinding {
    /// One `?` per element; values are bound.
    #[default]
    Bound,
    /// Values are quote-escaped and written into the SQL text.
    ///
    /// Text and numbers are written as quoted strings, `Null` as `NULL` and
    /// blobs as `X'..'` hex literals.
    ///
    /// Only safe when list elements never come from untrusted input.
    Inline,
}

impl ListBinding {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bound => "bound",
            Self::Inline => "inline",
        }
    }

    /// Parses a name, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "bound" => Some(Self::Bound),
            "inline" => Some(Self::Inline),
            _ => None,
        }
    }
}

impl fmt::Display for ListBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListBinding {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
            .ok_or_else(|| crate::Error::InvalidInput(format!("unknown list binding: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let options = QueryOptions::new()
            .fields(["id", "name"])
            .order_asc("name")
            .order_desc("id")
            .order("ignored", 0)
            .limit(10)
            .offset(20);

        assert_eq!(
            options.fields,
            Some(vec!["id".to_string(), "name".to_string()])
        );
        assert_eq!(
            options.order,
            vec![
                ("name".to_string(), ASC),
                ("id".to_string(), DESC),
                ("ignored".to_string(), 0)
            ]
        );
        assert_eq!(options.limit, Some(10));
        assert_eq!(options.offset, Some(20));
    }

    #[test]
    fn test_list_binding_parse() {
        assert_eq!(ListBinding::parse("INLINE"), Some(ListBinding::Inline));
        assert_eq!(ListBinding::parse(" bound "), Some(ListBinding::Bound));
        assert_eq!(ListBinding::parse("other"), None);
        assert!("nope".parse::<ListBinding>().is_err());
        assert_eq!(ListBinding::default(), ListBinding::Bound);
    }
}
