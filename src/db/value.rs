//! Conversion between JSON values and SQLite values.
//!
//! Rows travel through the engine as [`Record`]s, an insertion-ordered map
//! from column name to JSON value. Entities convert to and from records with
//! serde, so the engine never needs to know their shape.

use super::error::{DbError, DbResult};
use base64::prelude::*;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::Row;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value};

/// A row keyed by column name, in column order.
pub type Record = Map<String, Value>;

/// Converts a bound value to its SQLite representation.
///
/// Arrays and objects are stored as their JSON text.
pub fn to_sql(value: &Value) -> DbResult<SqlValue> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                SqlValue::Integer(i)
            } else if n.is_u64() {
                return Err(DbError::Value(format!("{} does not fit a signed 64-bit integer", n)));
            } else {
                SqlValue::Real(n.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    })
}

pub fn to_sql_params(values: &[Value]) -> DbResult<Vec<SqlValue>> {
    values.iter().map(to_sql).collect()
}

/// Converts a column value read from SQLite.
pub fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(BASE64_STANDARD.encode(b)),
    }
}

/// Reads every column of `row` into a [`Record`].
pub fn read_row(row: &Row<'_>, columns: &[String]) -> rusqlite::Result<Record> {
    let mut record = Record::with_capacity(columns.len());
    for (i, name) in columns.iter().enumerate() {
        record.insert(name.clone(), from_sql(row.get_ref(i)?));
    }
    Ok(record)
}

/// Serializes an entity into a record. Non-object values are rejected.
pub fn to_record<T: Serialize>(entity: &T) -> DbResult<Record> {
    match serde_json::to_value(entity)? {
        Value::Object(map) => Ok(map),
        other => Err(DbError::Value(format!("expected an object, got {}", other))),
    }
}

/// Deserializes a record into an entity.
pub fn from_record<T: DeserializeOwned>(record: Record) -> DbResult<T> {
    Ok(serde_json::from_value(Value::Object(record))?)
}
