//! PostgreSQL-backed catalog store.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::Postgres;

use crate::config::DatabaseConfig;
use crate::data_service::error::DbError;
use crate::data_service::models::{FootballClub, Item};
use crate::data_service::store::{CatalogStore, PoolStatus};

// `created_at::timestamp` decodes the same way whether the column is TIMESTAMP or TIMESTAMPTZ.
const ITEMS_QUERY: &str =
    "SELECT id, name, description, created_at::timestamp AS created_at FROM items ORDER BY id";
const CLUBS_QUERY: &str = "SELECT id, name, country, founded_year, created_at::timestamp AS created_at \
     FROM football_clubs ORDER BY id";

/// Catalog store over a bounded `PgPool`.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
    max_connections: u32,
}

impl PgCatalogStore {
    /// Open the pool, failing if the first connection cannot be established.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbError> {
        let pool = pool_options(config)
            .connect_with(connect_options(config))
            .await
            .map_err(|e| DbError::Unavailable(e.to_string()))?;

        tracing::info!(
            host = %config.host,
            database = %config.name,
            min_connections = config.min_connections,
            max_connections = config.max_connections,
            "Database connection pool created"
        );

        Ok(Self {
            pool,
            max_connections: config.max_connections,
        })
    }

    /// Build the pool without connecting; connections open on first use.
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        Self {
            pool: pool_options(config).connect_lazy_with(connect_options(config)),
            max_connections: config.max_connections,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn acquire(&self) -> Result<PoolConnection<Postgres>, DbError> {
        self.pool
            .acquire()
            .await
            .map_err(|e| DbError::Unavailable(e.to_string()))
    }
}

fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.name)
        .username(&config.user)
        .password(&config.password)
        .application_name(env!("CARGO_PKG_NAME"))
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn probe(&self) -> Result<PoolStatus, DbError> {
        let mut conn = self.acquire().await?;
        let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&mut *conn).await?;
        if one != 1 {
            return Err(DbError::ProbeFailed);
        }

        // Read while `conn` is still checked out so it counts as in use.
        Ok(PoolStatus {
            size: self.pool.size(),
            idle: u32::try_from(self.pool.num_idle()).unwrap_or(u32::MAX),
            max: self.max_connections,
        })
    }

    async fn list_items(&self) -> Result<Vec<Item>, DbError> {
        let mut conn = self.acquire().await?;
        let items = sqlx::query_as::<_, Item>(ITEMS_QUERY)
            .fetch_all(&mut *conn)
            .await?;
        Ok(items)
    }

    async fn list_clubs(&self) -> Result<Vec<FootballClub>, DbError> {
        let mut conn = self.acquire().await?;
        let clubs = sqlx::query_as::<_, FootballClub>(CLUBS_QUERY)
            .fetch_all(&mut *conn)
            .await?;
        Ok(clubs)
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection pool closed");
    }
}
