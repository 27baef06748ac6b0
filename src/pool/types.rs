#[cfg(feature = "postgres")]
use crate::postgres::PgPool;
#[cfg(feature = "sqlite")]
use crate::sqlite::SqlitePool;

/// Connection pool for database access
///
/// This enum wraps the bb8 pool of each supported engine.
#[derive(Clone)]
pub enum ConnectionPool {
    /// `PostgreSQL` connection pool
    #[cfg(feature = "postgres")]
    Postgres(PgPool),
    /// `SQLite` connection pool
    #[cfg(feature = "sqlite")]
    Sqlite(SqlitePool),
}

// bb8 pools print their state, the managers are left out
impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(pool) => f.debug_tuple("Postgres").field(&pool.state()).finish(),
            #[cfg(feature = "sqlite")]
            Self::Sqlite(pool) => f.debug_tuple("Sqlite").field(&pool.state()).finish(),
        }
    }
}
