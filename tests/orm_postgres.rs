#![cfg(feature = "postgres")]

//! Runs against a live server only when `BLOG_ORM_PG_HOST` is set; user,
//! password, database and port come from `BLOG_ORM_PG_USER`,
//! `BLOG_ORM_PG_PASSWORD`, `BLOG_ORM_PG_DATABASE` and `BLOG_ORM_PG_PORT`.

use std::env;

use blog_orm::models::{self, User};
use blog_orm::prelude::*;

fn pg_config() -> Option<PoolConfig> {
    let host = env::var("BLOG_ORM_PG_HOST").ok()?;
    let var = |name: &str, default: &str| env::var(name).unwrap_or_else(|_| default.to_string());
    let port = var("BLOG_ORM_PG_PORT", "5432").parse().unwrap_or(5432);
    Some(
        PoolConfig::new(
            DatabaseType::Postgres,
            var("BLOG_ORM_PG_USER", "postgres"),
            var("BLOG_ORM_PG_PASSWORD", "postgres"),
            var("BLOG_ORM_PG_DATABASE", "postgres"),
        )
        .with_host(host)
        .with_port(port)
        .with_size(1, 4),
    )
}

#[tokio::test(flavor = "multi_thread")]
async fn postgres_crud_and_paging() -> Result<(), Box<dyn std::error::Error>> {
    let Some(config) = pg_config() else {
        eprintln!("BLOG_ORM_PG_HOST not set; skipping");
        return Ok(());
    };
    models::register_all()?;
    let db = Database::create_pool(&config).await?;
    db.execute_batch(&models::drop_tables_sql()?).await?;
    db.execute_batch(&models::create_tables_sql()?).await?;

    for i in 1..=12 {
        let mut user = User {
            email: Some(format!("pg{i}@example.com")),
            name: Some(format!("pg{i}")),
            created_at: Some(f64::from(i)),
            ..User::default()
        };
        user.save(&db).await?;
    }

    let page = User::find_all(
        &db,
        FindOptions::new().order_by(r#""created_at""#).limit((10, 5)),
    )
    .await?;
    let stamps: Vec<f64> = page.iter().filter_map(|u| u.created_at).collect();
    assert_eq!(stamps, [11.0, 12.0]);

    let mut first = User::find_all(
        &db,
        FindOptions::new()
            .filter(r#""email"=?"#, vec![SqlValue::from("pg1@example.com")])
            .limit(1),
    )
    .await?
    .pop()
    .expect("pg1");
    assert_eq!(first.admin, Some(false));

    first.image = Some("about:blank".into());
    first.update(&db).await?;
    let found = User::find(&db, first.id.clone()).await?.expect("row");
    assert_eq!(found, first);

    let count = User::find_number(&db, "count(*)", None, Vec::new()).await?;
    assert_eq!(count, Some(SqlValue::Int(12)));

    let capped = db
        .select(r#"SELECT "id" FROM "users" ORDER BY "created_at""#, &[], Some(3))
        .await?;
    assert_eq!(capped.len(), 3);
    let all = db.select(r#"SELECT "id" FROM "users""#, &[], None).await?;
    assert_eq!(all.len(), 12);

    // a failing statement inside an explicit transaction leaves nothing behind
    let sql = r#"INSERT INTO "users" ("id", "email") VALUES (?, ?), (?, ?)"#;
    let args = [
        SqlValue::from("dup"),
        SqlValue::from("a@example.com"),
        SqlValue::from("dup"),
        SqlValue::from("b@example.com"),
    ];
    assert!(db.execute(sql, &args, false).await.is_err());
    assert_eq!(User::find(&db, "dup").await?, None);

    db.execute_batch(&models::drop_tables_sql()?).await?;
    Ok(())
}
