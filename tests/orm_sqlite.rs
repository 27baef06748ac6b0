#![cfg(feature = "sqlite")]

use std::sync::Arc;

use blog_orm::models::{self, Blog, User};
use blog_orm::prelude::*;
use tempfile::tempdir;

fn unique_db_path(prefix: &str) -> String {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join(format!("{prefix}.db"));
    // Leak the tempdir so the file persists for the duration of the test binary.
    std::mem::forget(dir);
    path.to_string_lossy().into_owned()
}

async fn blog_db(prefix: &str) -> Result<Database, OrmError> {
    models::register_all()?;
    let config = PoolConfig::new(DatabaseType::Sqlite, "www-data", "www-data", unique_db_path(prefix));
    let db = Database::create_pool(&config).await?;
    db.execute_batch(&models::create_tables_sql()?).await?;
    Ok(db)
}

fn user(email: &str, created_at: f64) -> User {
    User {
        email: Some(email.to_string()),
        passwd: Some("secret".to_string()),
        name: Some(email.split('@').next().unwrap_or_default().to_string()),
        created_at: Some(created_at),
        ..User::default()
    }
}

async fn count_users(db: &Database) -> Result<i64, OrmError> {
    let value = User::find_number(db, "count(*)", None, Vec::new()).await?;
    Ok(value.and_then(|v| v.as_int().copied()).unwrap_or(0))
}

#[tokio::test(flavor = "multi_thread")]
async fn find_on_missing_key_is_none() -> Result<(), Box<dyn std::error::Error>> {
    let db = blog_db("missing").await?;
    assert_eq!(User::find(&db, "no-such-id").await?, None);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn save_then_find_round_trips_with_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let db = blog_db("roundtrip").await?;

    let mut ann = User {
        email: Some("ann@example.com".into()),
        passwd: Some("secret".into()),
        name: Some("Ann".into()),
        ..User::default()
    };
    ann.save(&db).await?;

    // defaults were resolved and kept on the instance
    let id = ann.id.clone().expect("id default");
    assert_eq!(id.len(), 50);
    assert_eq!(ann.admin, Some(false));
    assert!(ann.created_at.is_some());
    // no default, never set
    assert_eq!(ann.image, None);

    let found = User::find(&db, id.as_str()).await?.expect("saved row");
    assert_eq!(found, ann);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn update_writes_unset_fields_as_null() -> Result<(), Box<dyn std::error::Error>> {
    let db = blog_db("update-null").await?;

    let mut bob = user("bob@example.com", 1.0);
    bob.image = Some("about:blank".into());
    bob.save(&db).await?;

    let mut changed = bob.clone();
    changed.image = None;
    changed.admin = None;
    changed.name = Some("Robert".into());
    changed.update(&db).await?;

    let found = User::find(&db, bob.id.clone()).await?.expect("row");
    assert_eq!(found.name.as_deref(), Some("Robert"));
    assert_eq!(found.image, None);
    // update does not substitute defaults, so the boolean is NULL rather than false
    assert_eq!(found.admin, None);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn find_all_filters_orders_and_limits() -> Result<(), Box<dyn std::error::Error>> {
    let db = blog_db("find-all").await?;
    for i in 1..=12 {
        user(&format!("u{i}@example.com"), f64::from(i)).save(&db).await?;
    }

    let first_five =
        User::find_all(&db, FindOptions::new().order_by(r#""created_at""#).limit(5)).await?;
    let stamps: Vec<f64> = first_five.iter().filter_map(|u| u.created_at).collect();
    assert_eq!(stamps, [1.0, 2.0, 3.0, 4.0, 5.0]);

    let page = User::find_all(
        &db,
        FindOptions::new().order_by(r#""created_at""#).limit((10, 5)),
    )
    .await?;
    let stamps: Vec<f64> = page.iter().filter_map(|u| u.created_at).collect();
    assert_eq!(stamps, [11.0, 12.0]);

    let filtered = User::find_all(
        &db,
        FindOptions::new()
            .filter(
                r#""created_at" > ? AND "created_at" <= ?"#,
                vec![SqlValue::Float(8.0), SqlValue::Float(10.0)],
            )
            .order_by(r#""created_at" desc"#),
    )
    .await?;
    let emails: Vec<&str> = filtered.iter().filter_map(|u| u.email.as_deref()).collect();
    assert_eq!(emails, ["u10@example.com", "u9@example.com"]);

    let nobody = FindOptions::new().filter(r#""email"=?"#, vec![SqlValue::from("nobody")]);
    assert!(User::find_all(&db, nobody).await?.is_empty());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_limit_is_a_validation_error() -> Result<(), Box<dyn std::error::Error>> {
    let db = blog_db("bad-limit").await?;
    let err = User::find_all(&db, FindOptions::new().limit(SqlValue::from("x")))
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::ValidationError(ref m) if m == "invalid limit value"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn find_number_returns_the_aggregate() -> Result<(), Box<dyn std::error::Error>> {
    let db = blog_db("count").await?;
    assert_eq!(count_users(&db).await?, 0);
    let empty_max = User::find_number(&db, r#"max("email")"#, None, Vec::new()).await?;
    assert_eq!(empty_max, None);
    for i in 0..3 {
        user(&format!("c{i}@example.com"), 1.0).save(&db).await?;
    }
    assert_eq!(count_users(&db).await?, 3);

    let max = User::find_number(
        &db,
        r#"max("email")"#,
        Some(r#""email" <> ?"#),
        vec![SqlValue::from("c2@example.com")],
    )
    .await?;
    assert_eq!(max, Some(SqlValue::from("c1@example.com")));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_saves_each_insert_one_row() -> Result<(), Box<dyn std::error::Error>> {
    let db = Arc::new(blog_db("concurrent").await?);

    let mut handles = Vec::new();
    for i in 0..32 {
        let db = Arc::clone(&db);
        handles.push(tokio::spawn(async move {
            let mut blog = Blog {
                name: Some(format!("post {i}")),
                content: Some("body".into()),
                ..Blog::default()
            };
            blog.save(&db).await?;
            Ok::<Option<String>, OrmError>(blog.id)
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await??.expect("id"));
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 32);

    let total = Blog::find_number(&db, "count(*)", None, Vec::new()).await?;
    assert_eq!(total, Some(SqlValue::Int(32)));
    for id in &ids {
        assert!(Blog::find(&db, id.as_str()).await?.is_some());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_statement_without_autocommit_leaves_no_rows() -> Result<(), Box<dyn std::error::Error>> {
    let db = blog_db("rollback").await?;
    user("seed@example.com", 1.0).save(&db).await?;
    let before = count_users(&db).await?;

    // the first row inserts, the second collides with it on the key
    let sql = r#"INSERT INTO "users" ("id", "email", "created_at") VALUES (?, ?, ?), (?, ?, ?)"#;
    let args = vec![
        SqlValue::from("dup"),
        SqlValue::from("one@example.com"),
        SqlValue::Float(2.0),
        SqlValue::from("dup"),
        SqlValue::from("two@example.com"),
        SqlValue::Float(3.0),
    ];
    let err = db.execute(sql, &args, false).await.unwrap_err();
    assert!(err.is_execution_error());

    assert_eq!(count_users(&db).await?, before);
    assert_eq!(User::find(&db, "dup").await?, None);

    // the connection is usable again after the rollback
    let affected = db
        .execute(
            r#"UPDATE "users" SET "name"=? WHERE "email"=?"#,
            &[SqlValue::from("Seed"), SqlValue::from("seed@example.com")],
            false,
        )
        .await?;
    assert_eq!(affected, 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn missed_update_and_remove_are_soft_failures() -> Result<(), Box<dyn std::error::Error>> {
    let db = blog_db("soft-fail").await?;

    let ghost = User {
        id: Some("ghost".into()),
        ..user("ghost@example.com", 1.0)
    };
    ghost.update(&db).await?;
    ghost.remove(&db).await?;
    assert_eq!(count_users(&db).await?, 0);

    let mut real = user("real@example.com", 1.0);
    real.save(&db).await?;
    real.remove(&db).await?;
    assert_eq!(User::find(&db, real.id.clone()).await?, None);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_key_on_save_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let db = blog_db("dup-save").await?;
    let mut first = user("a@example.com", 1.0);
    first.save(&db).await?;

    let mut second = User {
        id: first.id.clone(),
        ..user("b@example.com", 2.0)
    };
    let err = second.save(&db).await.unwrap_err();
    assert!(matches!(err, OrmError::SqliteError(_)));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn select_caps_rows_and_keeps_column_order() -> Result<(), Box<dyn std::error::Error>> {
    let db = blog_db("select").await?;
    for i in 0..4 {
        user(&format!("s{i}@example.com"), f64::from(i)).save(&db).await?;
    }

    let rs = db
        .select(
            r#"SELECT "email", "created_at" FROM "users" WHERE "created_at" >= ? ORDER BY "created_at""#,
            &[SqlValue::Float(1.0)],
            Some(2),
        )
        .await?;
    assert_eq!(rs.len(), 2);
    let row = &rs.results[0];
    let columns: Vec<&str> = row.iter().map(|(c, _)| c).collect();
    assert_eq!(columns, ["email", "created_at"]);
    assert_eq!(row.get("email"), Some(&SqlValue::from("s1@example.com")));

    let all = db.select(r#"SELECT "id" FROM "users""#, &[], None).await?;
    assert_eq!(all.len(), 4);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn in_memory_database_keeps_its_tables() -> Result<(), Box<dyn std::error::Error>> {
    models::register_all()?;
    let config = PoolConfig::new(DatabaseType::Sqlite, "u", "p", ":memory:");
    let db = Database::create_pool(&config).await?;
    db.execute_batch(&models::create_tables_sql()?).await?;

    user("mem@example.com", 1.0).save(&db).await?;
    assert_eq!(count_users(&db).await?, 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_credentials_fail_before_connecting() {
    let config = PoolConfig {
        database: Some(unique_db_path("never")),
        ..PoolConfig::default()
    };
    let err = Database::create_pool(&config).await.unwrap_err();
    assert!(matches!(err, OrmError::ConfigError(ref m) if m == "user is required"));
}
