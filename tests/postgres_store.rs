//! Tests against a live PostgreSQL instance.
//!
//! Run with `cargo test --test postgres_store -- --ignored` and the usual
//! `DB_HOST`/`DB_PORT`/`DB_NAME`/`DB_USER`/`DB_PASSWORD` variables set.

use platform_demo::config::loader::apply_env;
use platform_demo::config::StackConfig;
use platform_demo::data_service::{CatalogStore, PgCatalogStore};

async fn live_store() -> PgCatalogStore {
    let mut config = StackConfig::default();
    apply_env(&mut config, |key| std::env::var(key).ok()).unwrap();
    config.database.min_connections = 1;
    config.database.max_connections = 2;

    let store = PgCatalogStore::connect(&config.database)
        .await
        .expect("database reachable");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS items (
            id SERIAL PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            description TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(store.pool())
    .await
    .unwrap();
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS football_clubs (
            id SERIAL PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            country VARCHAR(100),
            founded_year INTEGER,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(store.pool())
    .await
    .unwrap();

    store
}

#[tokio::test]
#[ignore]
async fn test_probe_reports_headroom() {
    let store = live_store().await;
    let status = store.probe().await.unwrap();

    assert_eq!(status.max, 2);
    assert!(status.available() >= 1, "probe connection must be counted as in use");
    assert!(status.available() <= 2);

    store.close().await;
}

#[tokio::test]
#[ignore]
async fn test_items_come_back_in_id_order() {
    let store = live_store().await;
    sqlx::query("INSERT INTO items (name, description) VALUES ('zeta', NULL), ('eta', 'seventh')")
        .execute(store.pool())
        .await
        .unwrap();

    let items = store.list_items().await.unwrap();
    assert!(items.len() >= 2);
    assert!(items.windows(2).all(|w| w[0].id < w[1].id));
    assert!(items.iter().any(|i| i.name == "zeta" && i.description.is_none()));

    store.close().await;
}

#[tokio::test]
#[ignore]
async fn test_clubs_carry_all_columns() {
    let store = live_store().await;
    sqlx::query(
        "INSERT INTO football_clubs (name, country, founded_year) VALUES ('Ajax', 'Netherlands', 1900)",
    )
    .execute(store.pool())
    .await
    .unwrap();

    let clubs = store.list_clubs().await.unwrap();
    assert!(clubs.windows(2).all(|w| w[0].id < w[1].id));
    let ajax = clubs.iter().find(|c| c.name == "Ajax").unwrap();
    assert_eq!(ajax.country.as_deref(), Some("Netherlands"));
    assert_eq!(ajax.founded_year, Some(1900));

    store.close().await;
}
