//! Round-trip integration tests against a live Postgres.
//!
//! Ignored by default. Point SQLRECORD_TEST_* (or a `.env`) at a scratch
//! database and run with:
//!
//! ```text
//! cargo test -p sqlrecord-pg -- --ignored
//! ```

use std::sync::Arc;

use anyhow::Result;
use sqlrecord_core::{defaults, Error, Executor, Field, Limit, Model, Query, Schema, Value};
use sqlrecord_pg::{Db, DbConfig};

fn test_config() -> DbConfig {
    dotenvy::dotenv().ok();
    let var = |key: &str, fallback: &str| std::env::var(key).unwrap_or_else(|_| fallback.to_string());

    let mut config = DbConfig::new(
        var("SQLRECORD_TEST_USER", "postgres"),
        var("SQLRECORD_TEST_PASSWORD", "postgres"),
        var("SQLRECORD_TEST_DB", "sqlrecord_test"),
    );
    config.host = var("SQLRECORD_TEST_HOST", "127.0.0.1");
    config.port = var("SQLRECORD_TEST_PORT", "5432").parse().expect("port");
    config
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .ok();
}

fn account_schema(table: &str) -> Arc<Schema> {
    Schema::builder("Account")
        .table(table)
        .field("id", Field::string().primary_key().default_fn(defaults::uuid_hex))
        .field("email", Field::string())
        .field("admin", Field::boolean())
        .field("visits", Field::integer())
        .field("score", Field::float())
        .field("bio", Field::text())
        .build()
        .expect("schema")
}

async fn reset_table(db: &Db, table: &str) -> Result<()> {
    db.execute(&format!("drop table if exists `{table}`"), &[]).await?;
    db.execute(
        &format!(
            "create table `{table}` (\
             `id` varchar(100) primary key, \
             `email` varchar(100), \
             `admin` boolean, \
             `visits` bigint, \
             `score` real, \
             `bio` text)"
        ),
        &[],
    )
    .await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires database"]
async fn save_then_find_round_trips_every_kind() -> Result<()> {
    init_tracing();
    let db = Db::connect(&test_config()).await?;
    let schema = account_schema("sr_roundtrip");
    reset_table(&db, "sr_roundtrip").await?;

    let mut account = Model::with_values(
        Arc::clone(&schema),
        [
            ("email", Value::Text("ada@example.org".into())),
            ("admin", Value::Bool(true)),
            ("visits", Value::Int(42)),
            ("score", Value::Float(2.5)),
            ("bio", Value::Text("wrote the first program".into())),
        ],
    )?;
    account.save(&db).await?;

    // the factory-generated key was cached onto the instance by save
    let id = account.get("id").cloned().expect("generated key");

    let fetched = Model::find(&db, &schema, id.clone())
        .await?
        .expect("row saved above");
    assert_eq!(fetched.get("id"), Some(&id));
    assert_eq!(fetched.get("email"), Some(&Value::Text("ada@example.org".into())));
    assert_eq!(fetched.get("admin"), Some(&Value::Bool(true)));
    assert_eq!(fetched.get("visits"), Some(&Value::Int(42)));
    assert_eq!(fetched.get("score"), Some(&Value::Float(2.5)));
    assert_eq!(
        fetched.get("bio"),
        Some(&Value::Text("wrote the first program".into()))
    );

    db.close().await;
    Ok(())
}

#[tokio::test]
#[ignore = "requires database"]
async fn find_on_missing_key_returns_none() -> Result<()> {
    let db = Db::connect(&test_config()).await?;
    let schema = account_schema("sr_missing");
    reset_table(&db, "sr_missing").await?;

    let found = Model::find(&db, &schema, "no-such-key").await?;
    assert!(found.is_none());

    db.close().await;
    Ok(())
}

#[tokio::test]
#[ignore = "requires database"]
async fn find_all_windows_respect_offset_and_count() -> Result<()> {
    let db = Db::connect(&test_config()).await?;
    let schema = account_schema("sr_window");
    reset_table(&db, "sr_window").await?;

    for i in 0..20i64 {
        let mut account = Model::new(Arc::clone(&schema));
        account.set("email", format!("user{i}@example.org"))?;
        account.set("visits", i)?;
        account.save(&db).await?;
    }

    let capped = Model::find_all(
        &db,
        &schema,
        Query::new().order_by("`visits`").limit(5u64),
    )
    .await?;
    assert_eq!(capped.len(), 5);

    let window = Model::find_all(
        &db,
        &schema,
        Query::new()
            .order_by("`visits`")
            .limit(Limit::OffsetCount { offset: 10, count: 5 }),
    )
    .await?;
    let visits: Vec<_> = window
        .iter()
        .map(|m| m.get("visits").cloned().unwrap())
        .collect();
    assert_eq!(
        visits,
        vec![
            Value::Int(10),
            Value::Int(11),
            Value::Int(12),
            Value::Int(13),
            Value::Int(14)
        ]
    );

    db.close().await;
    Ok(())
}

#[tokio::test]
#[ignore = "requires database"]
async fn update_and_remove_round_trip() -> Result<()> {
    let db = Db::connect(&test_config()).await?;
    let schema = account_schema("sr_mutate");
    reset_table(&db, "sr_mutate").await?;

    let mut account = Model::new(Arc::clone(&schema));
    account.set("email", "ada@example.org")?;
    account.save(&db).await?;
    let id = account.get("id").cloned().expect("generated key");

    account.set("email", "countess@example.org")?;
    account.update(&db).await?;

    let fetched = Model::find(&db, &schema, id.clone()).await?.expect("updated row");
    assert_eq!(
        fetched.get("email"),
        Some(&Value::Text("countess@example.org".into()))
    );

    fetched.remove(&db).await?;
    assert!(Model::find(&db, &schema, id).await?.is_none());

    db.close().await;
    Ok(())
}

#[tokio::test]
#[ignore = "requires database"]
async fn concurrent_saves_stay_within_pool_bounds() -> Result<()> {
    let mut config = test_config();
    config.maxsize = 3;
    let db = Db::connect(&config).await?;
    let schema = account_schema("sr_concurrent");
    reset_table(&db, "sr_concurrent").await?;

    let tasks: Vec<_> = (0..12i64)
        .map(|i| {
            let db = db.clone();
            let schema = Arc::clone(&schema);
            tokio::spawn(async move {
                let mut account = Model::new(schema);
                account.set("email", format!("task{i}@example.org")).unwrap();
                account.set("visits", i).unwrap();
                account.save(&db).await
            })
        })
        .collect();

    for task in tasks {
        task.await.expect("task panicked")?;
    }

    assert!(db.pool().size() <= 3, "pool grew past maxsize");

    let all = Model::find_all(&db, &schema, Query::new()).await?;
    assert_eq!(all.len(), 12);

    db.close().await;
    Ok(())
}

#[tokio::test]
#[ignore = "requires database"]
async fn malformed_statement_propagates_driver_error() -> Result<()> {
    let db = Db::connect(&test_config()).await?;

    let err = db
        .execute("definitely not sql", &[])
        .await
        .expect_err("statement cannot parse");
    assert!(matches!(err, Error::Storage { .. }));

    db.close().await;
    Ok(())
}
