#[cfg(feature = "postgres")]
use crate::postgres::PgManager;
#[cfg(feature = "sqlite")]
use crate::sqlite::SqliteManager;

use super::types::ConnectionPool;
use crate::error::OrmError;

/// A connection checked out of a [`ConnectionPool`].
///
/// Returned to the pool when dropped, whether the statement succeeded or not.
pub enum PooledConnection {
    #[cfg(feature = "postgres")]
    Postgres(bb8::PooledConnection<'static, PgManager>),
    #[cfg(feature = "sqlite")]
    Sqlite(bb8::PooledConnection<'static, SqliteManager>),
}

impl std::fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(_) => f.debug_tuple("Postgres").field(&"<Client>").finish(),
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => f.debug_tuple("Sqlite").field(&"<Connection>").finish(),
        }
    }
}

impl ConnectionPool {
    /// Get a connection from the pool
    ///
    /// # Errors
    /// Returns `OrmError::PoolErrorPostgres` or `OrmError::ConnectionError` if the
    /// pool fails to provide a connection.
    pub async fn get_connection(&self) -> Result<PooledConnection, OrmError> {
        match self {
            #[cfg(feature = "postgres")]
            ConnectionPool::Postgres(pool) => Ok(PooledConnection::Postgres(pool.get_owned().await?)),
            #[cfg(feature = "sqlite")]
            ConnectionPool::Sqlite(pool) => Ok(PooledConnection::Sqlite(pool.get_owned().await?)),
        }
    }
}
