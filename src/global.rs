//! Optional process-wide [`Database`] slot for callers that prefer a single
//! shared handle over passing one around.

use std::sync::OnceLock;

use tracing::info;

use crate::config::PoolConfig;
use crate::error::OrmError;
use crate::pool::Database;

static DATABASE: OnceLock<Database> = OnceLock::new();

/// Store `db` as the process-wide handle.
///
/// # Errors
/// Returns `OrmError::ConfigError` if a handle was already stored.
pub fn install(db: Database) -> Result<&'static Database, OrmError> {
    DATABASE
        .set(db)
        .map_err(|_| OrmError::ConfigError("database pool already initialised".to_string()))?;
    database()
}

/// Build a pool from `config` and store it as the process-wide handle.
///
/// # Errors
/// Returns `OrmError::ConfigError` if the slot is already filled (checked
/// before any connection is opened) or `config` is incomplete, and the
/// driver's error if the pool cannot be built.
pub async fn init(config: &PoolConfig) -> Result<&'static Database, OrmError> {
    if DATABASE.get().is_some() {
        return Err(OrmError::ConfigError(
            "database pool already initialised".to_string(),
        ));
    }
    let db = Database::create_pool(config).await?;
    let installed = install(db)?;
    info!("global database pool installed");
    Ok(installed)
}

/// The process-wide handle.
///
/// # Errors
/// Returns `OrmError::ConfigError` if [`init`] has not run.
pub fn database() -> Result<&'static Database, OrmError> {
    DATABASE
        .get()
        .ok_or_else(|| OrmError::ConfigError("database pool not initialised".to_string()))
}
