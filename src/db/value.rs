//! Dynamic column value decoding
//!
//! Queries are opaque strings, so result columns can be of any type. Each
//! value is decoded into a tagged scalar by inspecting the column's wire
//! type, rather than an untyped blob, so the rest of the pipeline keeps
//! type safety.

use indexmap::IndexMap;
use serde::Serialize;
use tokio_postgres::types::Type;
use tokio_postgres::{Column, Row};

/// A single dynamically-typed column value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Json(serde_json::Value),
}

/// One result row in the query's column order
pub type ResultRow = IndexMap<String, SqlValue>;

/// Convert a database row into an ordered name -> value record
pub fn row_to_record(row: &Row) -> ResultRow {
    let mut record = ResultRow::new();
    for (idx, column) in row.columns().iter().enumerate() {
        record.insert(column.name().to_string(), decode_value(row, idx, column));
    }
    record
}

/// Decode one column value by its PostgreSQL type
///
/// Unknown types fall back to their text form where the driver permits,
/// otherwise null; decoding failures also degrade to null rather than
/// failing the whole row.
fn decode_value(row: &Row, idx: usize, column: &Column) -> SqlValue {
    let ty = column.type_();

    if *ty == Type::BOOL {
        opt(row.try_get::<usize, Option<bool>>(idx), SqlValue::Bool)
    } else if *ty == Type::INT2 {
        opt(row.try_get::<usize, Option<i16>>(idx), |v| {
            SqlValue::Int(i64::from(v))
        })
    } else if *ty == Type::INT4 {
        opt(row.try_get::<usize, Option<i32>>(idx), |v| {
            SqlValue::Int(i64::from(v))
        })
    } else if *ty == Type::INT8 {
        opt(row.try_get::<usize, Option<i64>>(idx), SqlValue::Int)
    } else if *ty == Type::FLOAT4 {
        opt(row.try_get::<usize, Option<f32>>(idx), |v| {
            SqlValue::Float(f64::from(v))
        })
    } else if *ty == Type::FLOAT8 {
        opt(row.try_get::<usize, Option<f64>>(idx), SqlValue::Float)
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        opt(
            row.try_get::<usize, Option<serde_json::Value>>(idx),
            SqlValue::Json,
        )
    } else if *ty == Type::TIMESTAMPTZ {
        opt(
            row.try_get::<usize, Option<chrono::DateTime<chrono::Utc>>>(idx),
            |v| SqlValue::Text(v.to_rfc3339()),
        )
    } else if *ty == Type::TIMESTAMP {
        opt(
            row.try_get::<usize, Option<chrono::NaiveDateTime>>(idx),
            |v| SqlValue::Text(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        )
    } else if *ty == Type::DATE {
        opt(row.try_get::<usize, Option<chrono::NaiveDate>>(idx), |v| {
            SqlValue::Text(v.to_string())
        })
    } else {
        // TEXT, VARCHAR, and anything else with a textual representation
        opt(row.try_get::<usize, Option<String>>(idx), SqlValue::Text)
    }
}

fn opt<T>(value: Result<Option<T>, tokio_postgres::Error>, wrap: impl Fn(T) -> SqlValue) -> SqlValue {
    match value {
        Ok(Some(v)) => wrap(v),
        Ok(None) | Err(_) => SqlValue::Null,
    }
}
