//! Persistence layer for the edit-coordination core.
//!
//! Stateless repositories over a shared `sqlx` pool. The store's conditional
//! writes are the only synchronization point — there is no in-process mutex
//! anywhere in this crate, and every operation is a single round-trip unless
//! documented otherwise.

pub mod batch;
pub mod error;
pub mod models;
pub mod repositories;

use sqlx::sqlite::SqlitePoolOptions;

pub type DbPool = sqlx::SqlitePool;

/// Create a connection pool from a database URL.
pub async fn connect(database_url: &str) -> Result<DbPool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

/// Create a connection pool from the `DATABASE_URL` environment variable,
/// loading a `.env` file first if one is present.
pub async fn connect_from_env() -> Result<DbPool, sqlx::Error> {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL")
        .map_err(|_| sqlx::Error::Configuration("DATABASE_URL is not set".into()))?;
    connect(&url).await
}

/// Apply all pending migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// Cheap connectivity check.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
