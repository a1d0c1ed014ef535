//! Filter compilation for `SQLite` queries.
//!
//! This module turns a [`Filter`] and [`QueryOptions`] into the tail of a
//! statement (`WHERE` / `ORDER BY` / `LIMIT` / `OFFSET`) plus the values to
//! bind to its `?` placeholders, in placeholder order.
//!
//! Field names are back-tick quoted and never bound. They are trusted,
//! caller-controlled identifiers.

use crate::models::{ASC, Constraint, DESC, Filter, ListBinding, QueryOptions, Value};

/// `LIMIT` value `SQLite` reads as "no limit".
///
/// `SQLite` rejects `OFFSET` without `LIMIT`, so an offset-only query is
/// given this limit.
pub const UNLIMITED: i64 = -1;

/// A compiled statement tail and its bound values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledFilter {
    /// Clause text, empty or starting with a space.
    pub clause: String,
    /// Values for the clause's placeholders, in order.
    pub values: Vec<Value>,
}

impl CompiledFilter {
    /// Number of `?` placeholders in the clause.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.clause.matches('?').count()
    }
}

/// Wraps an identifier in back-ticks.
///
/// Back-ticks inside the name are not escaped.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("`{name}`")
}

/// Escapes a value for inline embedding inside a single-quoted SQL literal.
///
/// Uses the value's textual form and doubles every `'`. No other validation
/// is performed.
///
/// # Examples
///
/// ```
/// use litestore::Value;
/// use litestore::storage::sqlite::escape_value;
///
/// assert_eq!(escape_value(&Value::from("a's")), "a''s");
/// assert_eq!(escape_value(&Value::Integer(7)), "7");
/// ```
#[must_use]
pub fn escape_value(value: &Value) -> String {
    value.to_string().replace('\'', "''")
}

/// Renders a value as an inline SQL literal.
///
/// Text and numbers become quoted strings, as the textual form is compared
/// under the column's affinity. `Null` stays the bare keyword and blobs use
/// `X'..'` so both compare the same way a bound value would.
fn inline_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Blob(bytes) => format!("X'{}'", hex::encode(bytes)),
        other => format!("'{}'", escape_value(other)),
    }
}

/// Compiles a filter and options into a clause and bound values.
///
/// Predicates follow filter insertion order and are joined with `AND`:
///
/// - `Equals` ⇒ `` `f`=? `` with the value bound
/// - `Matches` ⇒ `` `f` LIKE ? `` with the pattern body bound
/// - `OneOf` with [`ListBinding::Bound`] ⇒ `` `f` IN (?,?) `` with each element bound
/// - `OneOf` with [`ListBinding::Inline`] ⇒ `` `f` IN ('a','b') `` with nothing bound
///
/// An empty `OneOf` list compiles to `IN ()` in both modes and matches no row.
///
/// Order entries with a direction other than `1` or `-1` are skipped; if none
/// remain, no `ORDER BY` is emitted.
///
/// # Examples
///
/// ```
/// use litestore::{Filter, ListBinding, QueryOptions};
/// use litestore::storage::sqlite::compile_filter;
///
/// let compiled = compile_filter(
///     &Filter::new().eq("name", "n"),
///     &QueryOptions::new().order_desc("id").offset(5),
///     ListBinding::Bound,
/// );
/// assert_eq!(
///     compiled.clause,
///     " WHERE `name`=? ORDER BY `id` DESC LIMIT -1 OFFSET 5"
/// );
/// assert_eq!(compiled.values.len(), 1);
/// ```
#[must_use]
pub fn compile_filter(
    filter: &Filter,
    options: &QueryOptions,
    list_binding: ListBinding,
) -> CompiledFilter {
    let mut clause = String::new();
    let mut values = Vec::new();

    if !filter.is_empty() {
        let conditions: Vec<String> = filter
            .iter()
            .map(|(field, constraint)| {
                let field = quote_identifier(field);
                match constraint {
                    Constraint::Equals(value) => {
                        values.push(value.clone());
                        format!("{field}=?")
                    },
                    Constraint::Matches(pattern) => {
                        values.push(Value::Text(pattern.as_str().to_string()));
                        format!("{field} LIKE ?")
                    },
                    Constraint::OneOf(items) => match list_binding {
                        ListBinding::Bound => {
                            values.extend(items.iter().cloned());
                            let placeholders = vec!["?"; items.len()].join(",");
                            format!("{field} IN ({placeholders})")
                        },
                        ListBinding::Inline => {
                            let literals: Vec<String> = items
                                .iter()
                                .map(inline_literal)
                                .collect();
                            format!("{field} IN ({})", literals.join(","))
                        },
                    },
                }
            })
            .collect();
        clause.push_str(" WHERE ");
        clause.push_str(&conditions.join(" AND "));
    }

    let order_terms: Vec<String> = options
        .order
        .iter()
        .filter_map(|(field, direction)| match *direction {
            ASC => Some(format!("{} ASC", quote_identifier(field))),
            DESC => Some(format!("{} DESC", quote_identifier(field))),
            _ => None,
        })
        .collect();
    if !order_terms.is_empty() {
        clause.push_str(" ORDER BY ");
        clause.push_str(&order_terms.join(", "));
    }

    clause.push_str(&pagination_clause(options));

    CompiledFilter { clause, values }
}

/// Builds the `LIMIT` / `OFFSET` part of a clause.
///
/// A zero limit or offset counts as unset. An offset without a limit gets
/// [`UNLIMITED`].
#[must_use]
pub fn pagination_clause(options: &QueryOptions) -> String {
    let limit = options.limit.filter(|&n| n > 0);
    let offset = options.offset.filter(|&n| n > 0);

    let mut clause = String::new();
    match (limit, offset) {
        (Some(limit), _) => clause.push_str(&format!(" LIMIT {limit}")),
        (None, Some(_)) => clause.push_str(&format!(" LIMIT {UNLIMITED}")),
        (None, None) => {},
    }
    if let Some(offset) = offset {
        clause.push_str(&format!(" OFFSET {offset}"));
    }
    clause
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Pattern;

    #[test]
    fn test_escape_value() {
        assert_eq!(escape_value(&Value::from("plain")), "plain");
        assert_eq!(escape_value(&Value::from("a's")), "a''s");
        assert_eq!(escape_value(&Value::from("''")), "''''");
        assert_eq!(escape_value(&Value::Real(2.5)), "2.5");
        assert_eq!(escape_value(&Value::Null), "NULL");
    }

    #[test]
    fn test_empty_filter_no_where() {
        let compiled = compile_filter(&Filter::new(), &QueryOptions::new(), ListBinding::Bound);
        assert_eq!(compiled.clause, "");
        assert!(compiled.values.is_empty());
    }

    #[test]
    fn test_equals_predicates() {
        let filter = Filter::new().eq("a", 1).eq("b", "two");
        let compiled = compile_filter(&filter, &QueryOptions::new(), ListBinding::Bound);

        assert_eq!(compiled.clause, " WHERE `a`=? AND `b`=?");
        assert_eq!(compiled.values, vec![Value::Integer(1), Value::from("two")]);
        assert_eq!(compiled.placeholder_count(), 2);
    }

    #[test]
    fn test_pattern_predicate_binds_body() {
        let filter = Filter::new().matches("name", Pattern::parse_delimited("/ab.*/").unwrap());
        let compiled = compile_filter(&filter, &QueryOptions::new(), ListBinding::Bound);

        assert_eq!(compiled.clause, " WHERE `name` LIKE ?");
        assert_eq!(compiled.values, vec![Value::from("ab.*")]);
    }

    #[test]
    fn test_inline_list_is_escaped_and_unbound() {
        let filter = Filter::new().one_of("tag", ["a's", "b"]);
        let compiled = compile_filter(&filter, &QueryOptions::new(), ListBinding::Inline);

        assert_eq!(compiled.clause, " WHERE `tag` IN ('a''s','b')");
        assert!(compiled.values.is_empty());
        assert_eq!(compiled.placeholder_count(), 0);
    }

    #[test]
    fn test_inline_null_and_blob_literals() {
        let filter = Filter::new().one_of(
            "v",
            vec![Value::Null, Value::Blob(vec![0xde, 0xad]), Value::Integer(3)],
        );
        let compiled = compile_filter(&filter, &QueryOptions::new(), ListBinding::Inline);

        assert_eq!(compiled.clause, " WHERE `v` IN (NULL,X'dead','3')");
        assert!(compiled.values.is_empty());
    }

    #[test]
    fn test_bound_list_uses_placeholders() {
        let filter = Filter::new().one_of("id", [1, 2, 3]);
        let compiled = compile_filter(&filter, &QueryOptions::new(), ListBinding::Bound);

        assert_eq!(compiled.clause, " WHERE `id` IN (?,?,?)");
        assert_eq!(
            compiled.values,
            vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]
        );
    }

    #[test]
    fn test_empty_list() {
        let filter = Filter::new().one_of("id", Vec::<Value>::new());
        let bound = compile_filter(&filter, &QueryOptions::new(), ListBinding::Bound);
        let inline = compile_filter(&filter, &QueryOptions::new(), ListBinding::Inline);

        assert_eq!(bound.clause, " WHERE `id` IN ()");
        assert_eq!(inline.clause, " WHERE `id` IN ()");
    }

    #[test]
    fn test_mixed_predicates_value_order() {
        let filter = Filter::new()
            .eq("status", "active")
            .one_of("role", ["admin"])
            .matches("email", Pattern::new("%@x.org"));
        let compiled = compile_filter(&filter, &QueryOptions::new(), ListBinding::Inline);

        assert_eq!(
            compiled.clause,
            " WHERE `status`=? AND `role` IN ('admin') AND `email` LIKE ?"
        );
        assert_eq!(
            compiled.values,
            vec![Value::from("active"), Value::from("%@x.org")]
        );
    }

    #[test]
    fn test_order_by() {
        let options = QueryOptions::new().order("a", 1).order("b", -1);
        let compiled = compile_filter(&Filter::new(), &options, ListBinding::Bound);
        assert_eq!(compiled.clause, " ORDER BY `a` ASC, `b` DESC");
    }

    #[test]
    fn test_order_by_skips_unknown_directions() {
        let options = QueryOptions::new().order("a", 0);
        let compiled = compile_filter(&Filter::new(), &options, ListBinding::Bound);
        assert_eq!(compiled.clause, "");

        let options = QueryOptions::new().order("a", 2).order("b", -1).order("c", 0);
        let compiled = compile_filter(&Filter::new(), &options, ListBinding::Bound);
        assert_eq!(compiled.clause, " ORDER BY `b` DESC");
    }

    #[test]
    fn test_offset_without_limit_uses_sentinel() {
        let options = QueryOptions::new().offset(5);
        assert_eq!(pagination_clause(&options), " LIMIT -1 OFFSET 5");
    }

    #[test]
    fn test_limit_and_offset() {
        assert_eq!(
            pagination_clause(&QueryOptions::new().limit(10)),
            " LIMIT 10"
        );
        assert_eq!(
            pagination_clause(&QueryOptions::new().limit(10).offset(20)),
            " LIMIT 10 OFFSET 20"
        );
        assert_eq!(
            pagination_clause(&QueryOptions::new().limit(0).offset(0)),
            ""
        );
    }

    #[test]
    fn test_full_clause() {
        let compiled = compile_filter(
            &Filter::new().eq("kind", "note"),
            &QueryOptions::new().order_asc("created").limit(2).offset(4),
            ListBinding::Bound,
        );
        assert_eq!(
            compiled.clause,
            " WHERE `kind`=? ORDER BY `created` ASC LIMIT 2 OFFSET 4"
        );
    }
}
