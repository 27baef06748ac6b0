use std::sync::Arc;

use tracing::warn;

use crate::error::OrmError;
use crate::results::ResultSet;
use crate::types::SqlValue;

use super::config::SharedSqliteConnection;
use super::params::Params;
use super::query::build_result_set;

/// Run synchronous rusqlite work on the blocking pool while holding the connection.
pub(crate) async fn run_blocking<F, R>(conn: SharedSqliteConnection, func: F) -> Result<R, OrmError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, OrmError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(|e| OrmError::ExecutionError(format!("sqlite spawn_blocking join error: {e}")))?
}

/// Execute a SELECT and collect at most `max_rows` rows.
///
/// # Errors
/// Returns `OrmError` if preparing or executing the query fails.
pub async fn select(
    conn: &SharedSqliteConnection,
    query: &str,
    params: &[SqlValue],
    max_rows: Option<usize>,
) -> Result<ResultSet, OrmError> {
    let sql_owned = query.to_owned();
    let params_owned = Params::convert(params);
    run_blocking(Arc::clone(conn), move |guard| {
        let mut stmt = guard.prepare_cached(&sql_owned)?;
        build_result_set(&mut stmt, &params_owned, max_rows)
    })
    .await
}

/// Execute an INSERT/UPDATE/DELETE and return the affected-row count.
///
/// With `autocommit` off the statement runs inside an explicit transaction
/// that is committed on success and rolled back on failure; the original
/// error is returned either way.
///
/// # Errors
/// Returns `OrmError` if preparing, executing or committing fails.
pub async fn execute(
    conn: &SharedSqliteConnection,
    query: &str,
    params: &[SqlValue],
    autocommit: bool,
) -> Result<usize, OrmError> {
    let sql_owned = query.to_owned();
    let params_owned = Params::convert(params);
    run_blocking(Arc::clone(conn), move |guard| {
        if autocommit {
            return execute_on(guard, &sql_owned, &params_owned);
        }

        let tx = guard.transaction()?;
        match execute_on(&tx, &sql_owned, &params_owned) {
            Ok(affected) => {
                tx.commit()?;
                Ok(affected)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!("rollback after failed statement also failed: {rollback_err}");
                }
                Err(err)
            }
        }
    })
    .await
}

fn execute_on(
    conn: &rusqlite::Connection,
    sql: &str,
    params: &Params,
) -> Result<usize, OrmError> {
    let mut stmt = conn.prepare_cached(sql)?;
    Ok(stmt.execute(&params.as_refs()[..])?)
}

/// Execute a parameterless script (DDL) in one transaction.
///
/// # Errors
/// Returns `OrmError` if any statement of the batch fails.
pub async fn execute_batch(conn: &SharedSqliteConnection, query: &str) -> Result<(), OrmError> {
    let sql_owned = query.to_owned();
    run_blocking(Arc::clone(conn), move |guard| {
        let tx = guard.transaction()?;
        tx.execute_batch(&sql_owned)?;
        tx.commit()?;
        Ok(())
    })
    .await
}
