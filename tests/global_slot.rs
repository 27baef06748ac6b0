#![cfg(feature = "sqlite")]

use blog_orm::global;
use blog_orm::prelude::*;
use tempfile::tempdir;

#[tokio::test(flavor = "multi_thread")]
async fn global_pool_is_initialised_once() -> Result<(), Box<dyn std::error::Error>> {
    let err = global::database().unwrap_err();
    assert!(matches!(err, OrmError::ConfigError(_)));

    let dir = tempdir()?;
    let path = dir.path().join("global.db");
    let config = PoolConfig::new(DatabaseType::Sqlite, "u", "p", path.to_string_lossy());

    let db = global::init(&config).await?;
    assert_eq!(db.db_type(), DatabaseType::Sqlite);
    assert!(std::ptr::eq(db, global::database()?));

    let err = global::init(&config).await.unwrap_err();
    assert!(matches!(err, OrmError::ConfigError(ref m) if m == "database pool already initialised"));

    let rs = global::database()?.select("SELECT 1 AS one", &[], None).await?;
    assert_eq!(rs.results[0].get("one"), Some(&SqlValue::Int(1)));
    Ok(())
}
