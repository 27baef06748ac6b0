use futures_util::{StreamExt, TryStreamExt};
use tokio_postgres::{Client, Row};
use tracing::warn;

use crate::error::OrmError;
use crate::results::ResultSet;
use crate::types::SqlValue;

use super::params::Params;
use super::query::build_result_set;

/// Execute a SELECT and fetch at most `max_rows` rows.
///
/// Rows are pulled from the server stream one at a time; the stream is
/// dropped once `max_rows` have been read.
///
/// # Errors
/// Returns errors from statement preparation, execution or value extraction.
pub async fn select(
    client: &Client,
    query: &str,
    params: &[SqlValue],
    max_rows: Option<usize>,
) -> Result<ResultSet, OrmError> {
    let converted = Params::convert(params);
    let stmt = client.prepare(query).await?;
    let stream = client
        .query_raw(&stmt, converted.as_refs().iter().copied())
        .await?;
    let rows: Vec<Row> = match max_rows {
        Some(max) => stream.take(max).try_collect().await?,
        None => stream.try_collect().await?,
    };
    build_result_set(&stmt, &rows)
}

/// Execute an INSERT/UPDATE/DELETE and return the affected-row count.
///
/// With `autocommit` off the statement runs in an explicit transaction that is
/// rolled back when the statement fails; the statement's error is returned.
///
/// # Errors
/// Returns errors from preparation, execution or commit.
pub async fn execute(
    client: &mut Client,
    query: &str,
    params: &[SqlValue],
    autocommit: bool,
) -> Result<usize, OrmError> {
    let converted = Params::convert(params);
    if autocommit {
        let rows = client.execute(query, converted.as_refs()).await?;
        return Ok(affected(rows));
    }

    let tx = client.transaction().await?;
    match tx.execute(query, converted.as_refs()).await {
        Ok(rows) => {
            tx.commit().await?;
            Ok(affected(rows))
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!("rollback after failed statement also failed: {rollback_err}");
            }
            Err(err.into())
        }
    }
}

/// Execute a parameterless script (DDL) in one transaction.
///
/// # Errors
/// Returns errors from transaction operations or batch execution.
pub async fn execute_batch(client: &mut Client, query: &str) -> Result<(), OrmError> {
    let tx = client.transaction().await?;
    tx.batch_execute(query).await?;
    tx.commit().await?;
    Ok(())
}

fn affected(rows: u64) -> usize {
    usize::try_from(rows).unwrap_or(usize::MAX)
}
