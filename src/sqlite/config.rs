use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bb8::{ManageConnection, Pool};
use tokio::sync::Mutex;

use crate::config::PoolConfig;
use crate::error::OrmError;

/// A rusqlite connection that can be moved onto the blocking pool.
pub type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;

pub type SqlitePool = Pool<SqliteManager>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// bb8 manager opening rusqlite connections to one database file.
#[derive(Debug, Clone)]
pub struct SqliteManager {
    path: String,
}

impl SqliteManager {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// An in-memory database lives and dies with its single connection.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:" || self.path.contains("mode=memory")
    }

    /// Build a pool from this manager, sized by `config`.
    ///
    /// # Errors
    /// Returns `OrmError` if the initial connections cannot be opened.
    pub async fn build_pool(self, config: &PoolConfig) -> Result<SqlitePool, OrmError> {
        let builder = SqlitePool::builder();
        let builder = if self.is_in_memory() {
            builder
                .max_size(1)
                .min_idle(Some(1))
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            builder
                .max_size(config.maxsize)
                .min_idle(Some(config.minsize))
        };
        builder.build(self).await
    }
}

fn open_connection(path: &str) -> Result<rusqlite::Connection, OrmError> {
    let conn = rusqlite::Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    // journal_mode answers with the resulting mode ("memory" for in-memory databases)
    let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    Ok(conn)
}

impl ManageConnection for SqliteManager {
    type Connection = SharedSqliteConnection;
    type Error = OrmError;

    #[allow(clippy::manual_async_fn)]
    fn connect(&self) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send {
        let path = self.path.clone();
        async move {
            let conn = tokio::task::spawn_blocking(move || open_connection(&path))
                .await
                .map_err(|e| {
                    OrmError::ConnectionError(format!("sqlite open join error: {e}"))
                })??;
            Ok(Arc::new(Mutex::new(conn)))
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn is_valid(
        &self,
        conn: &mut Self::Connection,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        let handle = Arc::clone(conn);
        async move {
            super::executor::run_blocking(handle, |guard| {
                guard.query_row("SELECT 1", [], |_| Ok(()))?;
                Ok(())
            })
            .await
        }
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}
