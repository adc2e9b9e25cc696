//! Conversion between [`Value`] and SQLite's own value types.

use rusqlite::types::Value as SqlValue;
use vitals_core::{Row, Value};

use crate::error::{Result, StoreError};

/// Converts a cell value into an owned SQLite value for parameter binding.
pub(crate) fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(v) => SqlValue::Integer(*v),
        Value::Real(v) => SqlValue::Real(*v),
        Value::Text(v) => SqlValue::Text(v.clone()),
    }
}

/// Converts an SQLite cell into a [`Value`].
///
/// Blobs have no counterpart in the record model and are rejected.
pub(crate) fn from_sql(value: SqlValue) -> Result<Value> {
    match value {
        SqlValue::Null => Ok(Value::Null),
        SqlValue::Integer(v) => Ok(Value::Integer(v)),
        SqlValue::Real(v) => Ok(Value::Real(v)),
        SqlValue::Text(v) => Ok(Value::Text(v)),
        SqlValue::Blob(_) => Err(StoreError::Decode("blob cells are not supported".into())),
    }
}

/// Reads every column of the current result row as raw SQLite values.
pub(crate) fn read_raw_row(row: &rusqlite::Row<'_>, width: usize) -> rusqlite::Result<Vec<SqlValue>> {
    (0..width).map(|index| row.get::<_, SqlValue>(index)).collect()
}

/// Converts a raw row into a [`Row`].
pub(crate) fn decode_row(raw: Vec<SqlValue>) -> Result<Row> {
    raw.into_iter().map(from_sql).collect()
}
