use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrmError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PoolErrorPostgres(#[from] bb8::RunError<tokio_postgres::Error>),

    /// An entity declaration has no primary key, more than one, or repeats a field.
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Pool configuration is incomplete, or the process-wide handle is misused.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A caller-supplied query option has an unusable shape.
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}

impl OrmError {
    /// True for failures raised while talking to the database, as opposed to
    /// schema, configuration or validation mistakes made by the caller.
    #[must_use]
    pub fn is_execution_error(&self) -> bool {
        match self {
            #[cfg(feature = "postgres")]
            Self::PostgresError(_) | Self::PoolErrorPostgres(_) => true,
            #[cfg(feature = "sqlite")]
            Self::SqliteError(_) => true,
            Self::ConnectionError(_) | Self::ParameterError(_) | Self::ExecutionError(_) => true,
            Self::SchemaError(_) | Self::ConfigError(_) | Self::ValidationError(_) => false,
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<bb8::RunError<OrmError>> for OrmError {
    fn from(err: bb8::RunError<OrmError>) -> Self {
        match err {
            bb8::RunError::User(inner) => inner,
            bb8::RunError::TimedOut => {
                OrmError::ConnectionError("SQLite pool checkout timed out".to_string())
            }
        }
    }
}
