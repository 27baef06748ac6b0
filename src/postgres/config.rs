use std::future::Future;

use bb8::{ManageConnection, Pool};
use tokio_postgres::{Client, NoTls};
use tracing::{debug, warn};

use crate::config::PoolConfig;
use crate::error::OrmError;

pub type PgPool = Pool<PgManager>;

/// bb8 manager for Postgres clients.
pub struct PgManager {
    pub(crate) config: tokio_postgres::Config,
}

impl PgManager {
    #[must_use]
    pub fn new(config: tokio_postgres::Config) -> Self {
        Self { config }
    }

    /// Translate pool settings into a driver configuration.
    ///
    /// The charset is forwarded as the session `client_encoding`.
    #[must_use]
    pub fn from_pool_config(config: &PoolConfig) -> Self {
        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .host(&config.host)
            .port(config.port())
            .dbname(config.database_name())
            .options(format!("-c client_encoding={}", config.charset));
        if let Some(user) = &config.user {
            pg_config.user(user);
        }
        if let Some(password) = &config.password {
            pg_config.password(password);
        }
        Self::new(pg_config)
    }

    /// Build a pool from this manager, sized by `config`.
    ///
    /// # Errors
    /// Returns `OrmError` if pool creation fails.
    pub async fn build_pool(self, config: &PoolConfig) -> Result<PgPool, OrmError> {
        PgPool::builder()
            .max_size(config.maxsize)
            .min_idle(Some(config.minsize))
            .build(self)
            .await
            .map_err(|e| OrmError::ConnectionError(format!("postgres pool error: {e}")))
    }
}

impl ManageConnection for PgManager {
    type Connection = Client;
    type Error = tokio_postgres::Error;

    #[allow(clippy::manual_async_fn)]
    fn connect(&self) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send {
        let cfg = self.config.clone();
        async move {
            debug!(
                hosts = ?cfg.get_hosts(),
                db = ?cfg.get_dbname(),
                user = ?cfg.get_user(),
                "postgres connect start"
            );
            let (client, connection) = cfg.connect(NoTls).await?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    warn!("postgres connection closed with error: {e}");
                }
            });
            Ok(client)
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn is_valid(
        &self,
        conn: &mut Self::Connection,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        async move { conn.simple_query("SELECT 1").await.map(|_| ()) }
    }

    fn has_broken(&self, conn: &mut Self::Connection) -> bool {
        conn.is_closed()
    }
}
