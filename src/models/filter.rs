//! Declarative row filters.
//!
//! A [`Filter`] maps field names to [`Constraint`]s. Every entry must hold for
//! a row to match (entries are AND-combined); there is no OR and no nesting.
//!
//! # Examples
//!
//! ```
//! use litestore::{Filter, Pattern};
//!
//! let filter = Filter::new()
//!     .eq("status", "active")
//!     .one_of("role", ["admin", "owner"])
//!     .matches("email", Pattern::new("%@example.com"));
//! assert_eq!(filter.len(), 3);
//! ```

use super::Value;
use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Name of the primary-key column every store operation keys on.
pub const ID_COLUMN: &str = "id";

/// A constraint on a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// `field = value`.
    Equals(Value),
    /// `field IN (values...)`.
    OneOf(Vec<Value>),
    /// `field LIKE pattern`.
    Matches(Pattern),
}

impl From<Value> for Constraint {
    fn from(value: Value) -> Self {
        Self::Equals(value)
    }
}

impl From<Vec<Value>> for Constraint {
    fn from(values: Vec<Value>) -> Self {
        Self::OneOf(values)
    }
}

impl From<Pattern> for Constraint {
    fn from(pattern: Pattern) -> Self {
        Self::Matches(pattern)
    }
}

/// A `LIKE` pattern body.
///
/// The body is bound as-is, so `%` and `_` keep their `LIKE` meaning.
/// [`Pattern::parse_delimited`] accepts the `/body/flags` literal form and
/// strips the delimiters and any trailing flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern(String);

impl Pattern {
    /// Creates a pattern from its body.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    /// Parses a `/body/` literal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the literal does not start with `/`
    /// or has no closing `/`.
    ///
    /// # Examples
    ///
    /// ```
    /// use litestore::Pattern;
    ///
    /// assert_eq!(Pattern::parse_delimited("/ab.*/")?.as_str(), "ab.*");
    /// assert_eq!(Pattern::parse_delimited("/a%b/i")?.as_str(), "a%b");
    /// assert!(Pattern::parse_delimited("ab").is_err());
    /// # Ok::<(), litestore::Error>(())
    /// ```
    pub fn parse_delimited(literal: &str) -> Result<Self> {
        let rest = literal.strip_prefix('/').ok_or_else(|| {
            Error::InvalidInput(format!("pattern must start with '/': {literal}"))
        })?;
        let end = rest.rfind('/').ok_or_else(|| {
            Error::InvalidInput(format!("pattern has no closing '/': {literal}"))
        })?;
        Ok(Self(rest[..end].to_string()))
    }

    /// Returns the pattern body.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_delimited(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.0)
    }
}

/// An insertion-ordered set of field constraints.
///
/// An empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    constraints: Vec<(String, Constraint)>,
}

impl Filter {
    /// Creates an empty filter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            constraints: Vec::new(),
        }
    }

    /// Filter matching a single primary key.
    #[must_use]
    pub fn by_id(id: impl Into<Value>) -> Self {
        Self::new().eq(ID_COLUMN, id)
    }

    /// Sets the constraint for a field, replacing any previous one in place.
    pub fn insert(&mut self, field: impl Into<String>, constraint: impl Into<Constraint>) {
        let field = field.into();
        let constraint = constraint.into();
        match self.constraints.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = constraint,
            None => self.constraints.push((field, constraint)),
        }
    }

    /// Adds an equality constraint.
    #[must_use]
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, Constraint::Equals(value.into()));
        self
    }

    /// Adds a membership constraint.
    #[must_use]
    pub fn one_of<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.insert(field, Constraint::OneOf(values));
        self
    }

    /// Adds a `LIKE` constraint.
    #[must_use]
    pub fn matches(mut self, field: impl Into<String>, pattern: Pattern) -> Self {
        self.insert(field, Constraint::Matches(pattern));
        self
    }

    /// Returns the constraint for a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Constraint> {
        self.constraints
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, constraint)| constraint)
    }

    /// Number of constrained fields.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Returns `true` if nothing is constrained.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Iterates `(field, constraint)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Constraint)> {
        self.constraints
            .iter()
            .map(|(name, constraint)| (name.as_str(), constraint))
    }
}

impl<K: Into<String>, C: Into<Constraint>> FromIterator<(K, C)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, C)>>(iter: I) -> Self {
        let mut filter = Self::new();
        for (field, constraint) in iter {
            filter.insert(field, constraint);
        }
        filter
    }
}

/// Identifies the rows an operation targets.
#[derive(Debug, Clone, PartialEq)]
pub enum Identifier {
    /// A single primary key.
    Key(Value),
    /// Several primary keys.
    Keys(Vec<Value>),
    /// Arbitrary filter.
    Filter(Filter),
}

impl Identifier {
    /// Normalises the identifier into a filter on the `id` column.
    #[must_use]
    pub fn into_filter(self) -> Filter {
        match self {
            Self::Key(key) => Filter::by_id(key),
            Self::Keys(keys) => Filter::new().one_of(ID_COLUMN, keys),
            Self::Filter(filter) => filter,
        }
    }
}

impl From<Value> for Identifier {
    fn from(value: Value) -> Self {
        Self::Key(value)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self::Key(s.into())
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Self::Key(s.into())
    }
}

impl From<i64> for Identifier {
    fn from(n: i64) -> Self {
        Self::Key(n.into())
    }
}

impl From<Vec<Value>> for Identifier {
    fn from(keys: Vec<Value>) -> Self {
        Self::Keys(keys)
    }
}

impl From<Filter> for Identifier {
    fn from(filter: Filter) -> Self {
        Self::Filter(filter)
    }
}

impl From<&Filter> for Identifier {
    fn from(filter: &Filter) -> Self {
        Self::Filter(filter.clone())
    }
}
