//! Statement assembly.
//!
//! [`QueryBuilder`] puts a quoted table name, a projection and a
//! [`CompiledFilter`] clause together into complete statements.

use super::sql::{CompiledFilter, quote_identifier};
use crate::models::ID_COLUMN;
use crate::{Error, Result};

/// Builds statements against one table.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'a> {
    table: &'a str,
}

impl<'a> QueryBuilder<'a> {
    /// Creates a builder for `table`.
    #[must_use]
    pub const fn new(table: &'a str) -> Self {
        Self { table }
    }

    /// `SELECT <projection> FROM <table><clause>`.
    ///
    /// Projects `*` when `fields` is `None`.
    #[must_use]
    pub fn select(&self, fields: Option<&[String]>, filter: &CompiledFilter) -> String {
        let projection = match fields {
            None => "*".to_string(),
            Some(fields) => join_quoted(fields),
        };
        format!(
            "SELECT {projection} FROM {}{}",
            quote_identifier(self.table),
            filter.clause
        )
    }

    /// `SELECT * FROM <table> WHERE id=?`.
    #[must_use]
    pub fn select_by_id(&self) -> String {
        format!(
            "SELECT * FROM {} WHERE {}=?",
            quote_identifier(self.table),
            quote_identifier(ID_COLUMN)
        )
    }

    /// `SELECT count(*) FROM <table><clause>`.
    #[must_use]
    pub fn count(&self, filter: &CompiledFilter) -> String {
        format!(
            "SELECT count(*) FROM {}{}",
            quote_identifier(self.table),
            filter.clause
        )
    }

    /// `DELETE FROM <table><clause>`.
    #[must_use]
    pub fn delete(&self, filter: &CompiledFilter) -> String {
        format!("DELETE FROM {}{}", quote_identifier(self.table), filter.clause)
    }

    /// `INSERT INTO <table> (<cols>) VALUES (<placeholders>)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `columns` is empty.
    pub fn insert<S: AsRef<str>>(&self, columns: &[S]) -> Result<String> {
        self.require_columns("insert", columns)?;
        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(self.table),
            join_quoted(columns),
            vec!["?"; columns.len()].join(",")
        ))
    }

    /// `UPDATE <table> SET <col>=?,... WHERE id=?`.
    ///
    /// The key is bound after the column values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `columns` is empty.
    pub fn update<S: AsRef<str>>(&self, columns: &[S]) -> Result<String> {
        self.require_columns("update", columns)?;
        let assignments: Vec<String> = columns
            .iter()
            .map(|c| format!("{}=?", quote_identifier(c.as_ref())))
            .collect();
        Ok(format!(
            "UPDATE {} SET {} WHERE {}=?",
            quote_identifier(self.table),
            assignments.join(","),
            quote_identifier(ID_COLUMN)
        ))
    }

    /// Insert that updates the listed columns when the `id` already exists.
    ///
    /// Columns missing from `columns` keep their stored values on conflict.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `columns` is empty.
    pub fn upsert<S: AsRef<str>>(&self, columns: &[S]) -> Result<String> {
        let insert = self.insert(columns)?;
        let assignments: Vec<String> = columns
            .iter()
            .map(|c| c.as_ref())
            .filter(|c| *c != ID_COLUMN)
            .map(|c| {
                let quoted = quote_identifier(c);
                format!("{quoted}=excluded.{quoted}")
            })
            .collect();
        let action = if assignments.is_empty() {
            "DO NOTHING".to_string()
        } else {
            format!("DO UPDATE SET {}", assignments.join(","))
        };
        Ok(format!(
            "{insert} ON CONFLICT({}) {action}",
            quote_identifier(ID_COLUMN)
        ))
    }

    fn require_columns<S: AsRef<str>>(&self, statement: &str, columns: &[S]) -> Result<()> {
        if columns.is_empty() {
            return Err(Error::InvalidInput(format!(
                "cannot build {statement} for table '{}' from a record with no columns",
                self.table
            )));
        }
        Ok(())
    }
}

fn join_quoted<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|name| quote_identifier(name.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;

    fn clause(text: &str) -> CompiledFilter {
        CompiledFilter {
            clause: text.to_string(),
            values: vec![Value::Integer(1)],
        }
    }

    #[test]
    fn test_select_projection() {
        let builder = QueryBuilder::new("users");
        assert_eq!(
            builder.select(None, &CompiledFilter::default()),
            "SELECT * FROM `users`"
        );

        let fields = vec!["id".to_string(), "name".to_string()];
        assert_eq!(
            builder.select(Some(fields.as_slice()), &clause(" WHERE `id`=?")),
            "SELECT `id`,`name` FROM `users` WHERE `id`=?"
        );
    }

    #[test]
    fn test_select_by_id() {
        assert_eq!(
            QueryBuilder::new("t").select_by_id(),
            "SELECT * FROM `t` WHERE `id`=?"
        );
    }

    #[test]
    fn test_count_and_delete() {
        let builder = QueryBuilder::new("t");
        assert_eq!(
            builder.count(&clause(" WHERE `a`=?")),
            "SELECT count(*) FROM `t` WHERE `a`=?"
        );
        assert_eq!(
            builder.delete(&clause(" WHERE `a`=?")),
            "DELETE FROM `t` WHERE `a`=?"
        );
    }

    #[test]
    fn test_insert() {
        let sql = QueryBuilder::new("t").insert(&["id", "name"]).unwrap();
        assert_eq!(sql, "INSERT INTO `t` (`id`,`name`) VALUES (?,?)");
    }

    #[test]
    fn test_update() {
        let sql = QueryBuilder::new("t").update(&["name", "age"]).unwrap();
        assert_eq!(sql, "UPDATE `t` SET `name`=?,`age`=? WHERE `id`=?");
    }

    #[test]
    fn test_upsert() {
        let builder = QueryBuilder::new("t");
        assert_eq!(
            builder.upsert(&["id", "name"]).unwrap(),
            "INSERT INTO `t` (`id`,`name`) VALUES (?,?) ON CONFLICT(`id`) DO UPDATE SET `name`=excluded.`name`"
        );
        assert_eq!(
            builder.upsert(&["id"]).unwrap(),
            "INSERT INTO `t` (`id`) VALUES (?) ON CONFLICT(`id`) DO NOTHING"
        );
    }

    #[test]
    fn test_empty_columns_rejected() {
        let builder = QueryBuilder::new("t");
        let none: [&str; 0] = [];
        assert!(matches!(builder.insert(&none), Err(Error::InvalidInput(_))));
        assert!(matches!(builder.update(&none), Err(Error::InvalidInput(_))));
        assert!(matches!(builder.upsert(&none), Err(Error::InvalidInput(_))));
    }
}
