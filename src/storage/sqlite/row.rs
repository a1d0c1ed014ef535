//! Conversion between driver values and [`Value`] / [`Record`].

use crate::models::{Record, Value};
use crate::{Error, Result};
use rusqlite::Row;
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Borrowed(match self {
            Self::Null => ValueRef::Null,
            Self::Integer(n) => ValueRef::Integer(*n),
            Self::Real(f) => ValueRef::Real(*f),
            Self::Text(s) => ValueRef::Text(s.as_bytes()),
            Self::Blob(b) => ValueRef::Blob(b),
        }))
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(n) => Self::Integer(n),
            ValueRef::Real(f) => Self::Real(f),
            ValueRef::Text(bytes) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Self::Blob(bytes.to_vec()),
        }
    }
}

/// Builds a [`Record`] from a result row.
///
/// `columns` are the statement's column names, in result order.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if a column cannot be read.
pub fn record_from_row(row: &Row<'_>, columns: &[String]) -> Result<Record> {
    let mut record = Record::with_capacity(columns.len());
    for (idx, name) in columns.iter().enumerate() {
        let value = row
            .get_ref(idx)
            .map_err(|e| Error::operation("read_column", e))?;
        record.insert(name.clone(), Value::from(value));
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_values_bind_and_read_back() {
        let conn = Connection::open_in_memory().unwrap();
        let inputs = [
            Value::Null,
            Value::Integer(-7),
            Value::Real(0.25),
            Value::from("héllo"),
            Value::Blob(vec![1, 2, 3]),
        ];

        for input in inputs {
            let output: Value = conn
                .query_row("SELECT ?1", [&input], |row| Ok(Value::from(row.get_ref(0)?)))
                .unwrap();
            assert_eq!(output, input);
        }
    }

    #[test]
    fn test_record_from_row_keeps_column_order() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn.prepare("SELECT 'x' AS id, 3 AS n, NULL AS gone").unwrap();
        let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();

        let record = stmt
            .query_row([], |row| Ok(record_from_row(row, &columns)))
            .unwrap()
            .unwrap();

        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["id", "n", "gone"]);
        assert_eq!(record.get("id"), Some(&Value::from("x")));
        assert_eq!(record.get("n"), Some(&Value::Integer(3)));
        assert_eq!(record.get("gone"), Some(&Value::Null));
    }
}
