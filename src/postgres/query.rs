use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::Value;
use tokio_postgres::{Row, Statement};

use crate::error::OrmError;
use crate::results::ResultSet;
use crate::types::SqlValue;

/// Extract a `SqlValue` from a `tokio_postgres` row at the given index.
///
/// # Errors
/// Returns `OrmError` if the column cannot be decoded.
pub fn postgres_extract_value(row: &Row, idx: usize) -> Result<SqlValue, OrmError> {
    let type_name = row.columns()[idx].type_().name();
    let value = match type_name {
        "int2" => {
            let val: Option<i16> = row.try_get(idx)?;
            val.map_or(SqlValue::Null, |v| SqlValue::Int(i64::from(v)))
        }
        "int4" => {
            let val: Option<i32> = row.try_get(idx)?;
            val.map_or(SqlValue::Null, |v| SqlValue::Int(i64::from(v)))
        }
        "int8" => {
            let val: Option<i64> = row.try_get(idx)?;
            val.map_or(SqlValue::Null, SqlValue::Int)
        }
        "float4" => {
            let val: Option<f32> = row.try_get(idx)?;
            val.map_or(SqlValue::Null, |v| SqlValue::Float(f64::from(v)))
        }
        "float8" => {
            let val: Option<f64> = row.try_get(idx)?;
            val.map_or(SqlValue::Null, SqlValue::Float)
        }
        "bool" => {
            let val: Option<bool> = row.try_get(idx)?;
            val.map_or(SqlValue::Null, SqlValue::Bool)
        }
        "timestamp" => {
            let val: Option<NaiveDateTime> = row.try_get(idx)?;
            val.map_or(SqlValue::Null, SqlValue::Timestamp)
        }
        "json" | "jsonb" => {
            let val: Option<Value> = row.try_get(idx)?;
            val.map_or(SqlValue::Null, SqlValue::JSON)
        }
        "bytea" => {
            let val: Option<Vec<u8>> = row.try_get(idx)?;
            val.map_or(SqlValue::Null, SqlValue::Blob)
        }
        // text, varchar, bpchar, name and anything else readable as a string
        _ => {
            let val: Option<String> = row.try_get(idx)?;
            val.map_or(SqlValue::Null, SqlValue::Text)
        }
    };
    Ok(value)
}

/// Build a result set using statement metadata for column names.
///
/// # Errors
/// Returns errors from row value extraction.
pub fn build_result_set(stmt: &Statement, rows: &[Row]) -> Result<ResultSet, OrmError> {
    let column_names: Vec<String> = stmt
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();
    let column_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(rows.len());
    result_set.set_column_names(Arc::new(column_names));

    for row in rows {
        let mut row_values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            row_values.push(postgres_extract_value(row, idx)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}
