//! A small async ORM for the blog: declarative entity mappings, typed CRUD
//! records and a pooled SQL execution layer over `SQLite` or `PostgreSQL`.
//!
//! ```rust,no_run
//! use blog_orm::prelude::*;
//! use blog_orm::models::{self, User};
//!
//! # async fn demo() -> Result<(), OrmError> {
//! models::register_all()?;
//! let config = PoolConfig::new(DatabaseType::Sqlite, "www-data", "www-data", "blog.db");
//! let db = Database::create_pool(&config).await?;
//! db.execute_batch(&models::create_tables_sql()?).await?;
//!
//! let mut user = User {
//!     email: Some("ann@example.com".into()),
//!     name: Some("Ann".into()),
//!     ..User::default()
//! };
//! user.save(&db).await?;
//! let found = User::find(&db, user.id.clone()).await?;
//! assert_eq!(found.as_ref(), Some(&user));
//! # Ok(())
//! # }
//! ```

#[cfg(not(any(feature = "sqlite", feature = "postgres")))]
compile_error!("enable at least one of the `sqlite` or `postgres` features");

pub mod config;
pub mod error;
pub mod global;
pub mod models;
pub mod orm;
pub mod pool;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod prelude;
pub mod results;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod translation;
pub mod types;

pub use config::{PoolConfig, Settings};
pub use error::OrmError;
pub use pool::Database;
pub use results::{DbRow, ResultSet};
pub use types::{DatabaseType, SqlValue};
