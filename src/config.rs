use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::OrmError;
use crate::types::DatabaseType;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_PG_PORT: u16 = 5432;
pub const DEFAULT_CHARSET: &str = "utf8";
pub const DEFAULT_MAX_SIZE: u32 = 10;
pub const DEFAULT_MIN_SIZE: u32 = 1;

/// Connection settings for [`Database::create_pool`](crate::Database::create_pool).
///
/// `user`, `password` and `database` have no defaults; a pool is never built
/// without them. For `SQLite`, `database` is the file path (or `:memory:`).
/// An unset `port` resolves per backend, see [`port`](Self::port).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub backend: DatabaseType,
    pub host: String,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub charset: String,
    pub autocommit: bool,
    pub maxsize: u32,
    pub minsize: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            host: DEFAULT_HOST.to_string(),
            port: None,
            user: None,
            password: None,
            database: None,
            charset: DEFAULT_CHARSET.to_string(),
            autocommit: true,
            maxsize: DEFAULT_MAX_SIZE,
            minsize: DEFAULT_MIN_SIZE,
        }
    }
}

#[cfg(feature = "sqlite")]
fn default_backend() -> DatabaseType {
    DatabaseType::Sqlite
}

#[cfg(not(feature = "sqlite"))]
fn default_backend() -> DatabaseType {
    DatabaseType::Postgres
}

impl PoolConfig {
    #[must_use]
    pub fn new(
        backend: DatabaseType,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            user: Some(user.into()),
            password: Some(password.into()),
            database: Some(database.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn with_autocommit(mut self, autocommit: bool) -> Self {
        self.autocommit = autocommit;
        self
    }

    #[must_use]
    pub fn with_size(mut self, minsize: u32, maxsize: u32) -> Self {
        self.minsize = minsize;
        self.maxsize = maxsize;
        self
    }

    /// Check that the required credentials are present and the sizing is usable.
    ///
    /// # Errors
    /// Returns `OrmError::ConfigError` naming the first missing or inconsistent field.
    pub fn validate(&self) -> Result<(), OrmError> {
        for (name, value) in [
            ("user", &self.user),
            ("password", &self.password),
            ("database", &self.database),
        ] {
            if value.is_none() {
                return Err(OrmError::ConfigError(format!("{name} is required")));
            }
        }
        if self.maxsize == 0 {
            return Err(OrmError::ConfigError(
                "maxsize must be at least 1".to_string(),
            ));
        }
        if self.minsize > self.maxsize {
            return Err(OrmError::ConfigError(format!(
                "minsize ({}) exceeds maxsize ({})",
                self.minsize, self.maxsize
            )));
        }
        Ok(())
    }

    /// The configured port, or the backend's usual one: 5432 for Postgres,
    /// [`DEFAULT_PORT`] otherwise.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(match self.backend {
            #[cfg(feature = "postgres")]
            DatabaseType::Postgres => DEFAULT_PG_PORT,
            #[allow(unreachable_patterns)]
            _ => DEFAULT_PORT,
        })
    }

    /// The configured database name or path. Only meaningful after [`validate`](Self::validate).
    #[must_use]
    pub fn database_name(&self) -> &str {
        self.database.as_deref().unwrap_or_default()
    }
}

/// Application settings: the defaults below with an optional override document merged in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub debug: bool,
    pub db: PoolConfig,
}

impl Settings {
    /// Built-in defaults, the base every override is merged into.
    ///
    /// Every `PoolConfig` key is listed, since [`merge`] drops keys the base
    /// lacks. `port` is `null` so it follows the backend unless overridden.
    #[must_use]
    pub fn defaults() -> Value {
        json!({
            "debug": true,
            "db": {
                "backend": default_backend(),
                "host": "127.0.0.1",
                "port": null,
                "user": "www-data",
                "password": "www-data",
                "database": "awesome",
                "charset": DEFAULT_CHARSET,
                "autocommit": true,
                "maxsize": DEFAULT_MAX_SIZE,
                "minsize": DEFAULT_MIN_SIZE
            }
        })
    }

    /// Merge `overrides` into `defaults` and deserialize the result.
    ///
    /// # Errors
    /// Returns `OrmError::ConfigError` if the merged document does not describe valid settings.
    pub fn from_documents(defaults: &Value, overrides: Option<&Value>) -> Result<Self, OrmError> {
        let merged = match overrides {
            Some(overrides) => merge(defaults, overrides),
            None => defaults.clone(),
        };
        serde_json::from_value(merged)
            .map_err(|e| OrmError::ConfigError(format!("invalid settings: {e}")))
    }

    /// Load settings from JSON files. A missing defaults path means the built-in defaults.
    ///
    /// # Errors
    /// Returns `OrmError::ConfigError` if a file cannot be read or parsed.
    pub fn load(defaults: Option<&Path>, overrides: Option<&Path>) -> Result<Self, OrmError> {
        let base = match defaults {
            Some(path) => read_json(path)?,
            None => Self::defaults(),
        };
        let overrides = overrides.map(read_json).transpose()?;
        Self::from_documents(&base, overrides.as_ref())
    }
}

fn read_json(path: &Path) -> Result<Value, OrmError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| OrmError::ConfigError(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| OrmError::ConfigError(format!("cannot parse {}: {e}", path.display())))
}

/// Deep-merge `overrides` into `defaults`.
///
/// Only keys present in `defaults` survive; nested objects merge recursively,
/// everything else is replaced wholesale by the override.
#[must_use]
pub fn merge(defaults: &Value, overrides: &Value) -> Value {
    let (Value::Object(base), Value::Object(over)) = (defaults, overrides) else {
        return overrides.clone();
    };
    let merged = base
        .iter()
        .map(|(key, value)| {
            let value = match over.get(key) {
                Some(replacement) if value.is_object() => merge(value, replacement),
                Some(replacement) => replacement.clone(),
                None => value.clone(),
            };
            (key.clone(), value)
        })
        .collect();
    Value::Object(merged)
}
