pub mod connection;
pub mod types;

pub use connection::PooledConnection;
pub use types::ConnectionPool;

use tracing::{debug, info};

use crate::config::PoolConfig;
use crate::error::OrmError;
#[cfg(feature = "postgres")]
use crate::postgres::{self, PgManager};
use crate::results::ResultSet;
#[cfg(feature = "sqlite")]
use crate::sqlite::{self, SqliteManager};
use crate::translation::{PlaceholderStyle, translate_placeholders};
use crate::types::{DatabaseType, SqlValue};

/// Handle to a database: the connection pool plus the settings statements run with.
///
/// Create one at startup with [`Database::create_pool`] and pass it by reference;
/// clones share the same pool.
#[derive(Clone, Debug)]
pub struct Database {
    pool: ConnectionPool,
    db_type: DatabaseType,
    autocommit: bool,
}

impl Database {
    /// Validate `config` and build the connection pool it describes.
    ///
    /// # Errors
    /// Returns `OrmError::ConfigError` if a required setting is missing, or the
    /// driver's error if the initial connections cannot be opened.
    pub async fn create_pool(config: &PoolConfig) -> Result<Self, OrmError> {
        config.validate()?;
        info!("create database connection pool...");
        let pool = match config.backend {
            #[cfg(feature = "postgres")]
            DatabaseType::Postgres => ConnectionPool::Postgres(
                PgManager::from_pool_config(config)
                    .build_pool(config)
                    .await?,
            ),
            #[cfg(feature = "sqlite")]
            DatabaseType::Sqlite => ConnectionPool::Sqlite(
                SqliteManager::new(config.database_name())
                    .build_pool(config)
                    .await?,
            ),
        };
        Ok(Self {
            pool,
            db_type: config.backend,
            autocommit: config.autocommit,
        })
    }

    #[must_use]
    pub fn db_type(&self) -> DatabaseType {
        self.db_type
    }

    /// The autocommit mode entity writes run with.
    #[must_use]
    pub fn autocommit(&self) -> bool {
        self.autocommit
    }

    #[must_use]
    pub fn placeholder_style(&self) -> PlaceholderStyle {
        match self.db_type {
            #[cfg(feature = "postgres")]
            DatabaseType::Postgres => PlaceholderStyle::Postgres,
            #[cfg(feature = "sqlite")]
            DatabaseType::Sqlite => PlaceholderStyle::Sqlite,
        }
    }

    /// Check a connection out of the pool for direct driver access.
    ///
    /// # Errors
    /// Returns the pool's error if no connection becomes available.
    pub async fn get_connection(&self) -> Result<PooledConnection, OrmError> {
        self.pool.get_connection().await
    }

    /// Run a query with `?` placeholders and collect at most `max_rows` rows
    /// (every row when `None`).
    ///
    /// # Errors
    /// Returns the driver's error if checkout, preparation or execution fails.
    pub async fn select(
        &self,
        sql: &str,
        args: &[SqlValue],
        max_rows: Option<usize>,
    ) -> Result<ResultSet, OrmError> {
        info!("SQL: {sql}");
        debug!(?args, "select args");
        let native = translate_placeholders(sql, self.placeholder_style());
        let conn = self.pool.get_connection().await?;
        let result_set = match &conn {
            #[cfg(feature = "postgres")]
            PooledConnection::Postgres(client) => {
                postgres::select(client, &native, args, max_rows).await?
            }
            #[cfg(feature = "sqlite")]
            PooledConnection::Sqlite(handle) => {
                sqlite::select(handle, &native, args, max_rows).await?
            }
        };
        info!("rows returned: {}", result_set.len());
        Ok(result_set)
    }

    /// Run an INSERT/UPDATE/DELETE with `?` placeholders and return the
    /// affected-row count.
    ///
    /// With `autocommit` off the statement runs in its own transaction and is
    /// rolled back if it fails. The failure is always returned to the caller.
    ///
    /// # Errors
    /// Returns the driver's error if checkout, execution or commit fails.
    pub async fn execute(
        &self,
        sql: &str,
        args: &[SqlValue],
        autocommit: bool,
    ) -> Result<usize, OrmError> {
        info!("SQL: {sql}");
        debug!(?args, autocommit, "execute args");
        let native = translate_placeholders(sql, self.placeholder_style());
        let mut conn = self.pool.get_connection().await?;
        match &mut conn {
            #[cfg(feature = "postgres")]
            PooledConnection::Postgres(client) => {
                postgres::execute(client, &native, args, autocommit).await
            }
            #[cfg(feature = "sqlite")]
            PooledConnection::Sqlite(handle) => {
                sqlite::execute(handle, &native, args, autocommit).await
            }
        }
    }

    /// Run a parameterless multi-statement script, such as table DDL, in one
    /// transaction.
    ///
    /// # Errors
    /// Returns the driver's error if any statement fails.
    pub async fn execute_batch(&self, sql: &str) -> Result<(), OrmError> {
        info!("SQL: {sql}");
        let mut conn = self.pool.get_connection().await?;
        match &mut conn {
            #[cfg(feature = "postgres")]
            PooledConnection::Postgres(client) => postgres::execute_batch(client, sql).await,
            #[cfg(feature = "sqlite")]
            PooledConnection::Sqlite(handle) => sqlite::execute_batch(handle, sql).await,
        }
    }
}
