use std::sync::Arc;

use rusqlite::Statement;
use rusqlite::types::Value;

use crate::error::OrmError;
use crate::results::ResultSet;
use crate::types::SqlValue;

use super::params::Params;

/// Extract a `SqlValue` from a `SQLite` row.
///
/// # Errors
/// Returns `OrmError` if the column cannot be read.
pub fn extract_value(row: &rusqlite::Row, idx: usize) -> Result<SqlValue, OrmError> {
    let value: Value = row.get(idx)?;
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Int(i),
        Value::Real(f) => SqlValue::Float(f),
        Value::Text(s) => SqlValue::Text(s),
        Value::Blob(b) => SqlValue::Blob(b),
    })
}

/// Run a prepared SELECT and collect up to `max_rows` rows (all when `None`).
///
/// # Errors
/// Returns `OrmError` if binding, stepping or value extraction fails.
pub fn build_result_set(
    stmt: &mut Statement,
    params: &Params,
    max_rows: Option<usize>,
) -> Result<ResultSet, OrmError> {
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let col_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(max_rows.unwrap_or(10).min(64));
    result_set.set_column_names(Arc::new(column_names));

    let mut rows = stmt.query(&params.as_refs()[..])?;
    while max_rows.is_none_or(|max| result_set.len() < max) {
        let Some(row) = rows.next()? else {
            break;
        };
        let mut values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            values.push(extract_value(row, i)?);
        }
        result_set.add_row_values(values);
    }

    Ok(result_set)
}
