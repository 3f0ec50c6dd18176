//! Database pool construction and schema migrations.

use crate::config::CoreConfig;
use crate::CoreResult;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Open a connection pool for the configured database and apply pending migrations.
pub async fn connect(cfg: &CoreConfig) -> CoreResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(cfg.database_url())?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(cfg.max_connections())
        .acquire_timeout(cfg.acquire_timeout())
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    tracing::info!("-- Connected to database {}", cfg.database_url());

    Ok(pool)
}

/// Apply the embedded schema migrations.
pub async fn migrate(pool: &SqlitePool) -> CoreResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Single-connection in-memory database with the schema applied.
///
/// Every connection to `sqlite::memory:` is a separate database, so the pool is pinned to one
/// connection that is never recycled.
pub async fn connect_in_memory() -> CoreResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}
