//! PostgreSQL pool and schema migrations

use sqlx::migrate::MigrateError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Could not connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Schema migration failed: {0}")]
    Migrate(#[from] MigrateError),

    #[error("Database unreachable: {0}")]
    Unreachable(#[source] sqlx::Error),
}

/// Open the pool sized by `DB_MAX_CONNECTIONS`
pub async fn create_pool(config: &Config) -> Result<PgPool, DbError> {
    let url = config.database_url_masked();
    tracing::info!(database = %url, max_connections = config.db_max_connections, "Opening database pool");

    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .connect(&config.database_url)
        .await
        .map_err(|source| DbError::Connect { url, source })
}

/// Apply the embedded `migrations/` directory (users, sessions, applications)
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    let migrator = sqlx::migrate!("./migrations");
    migrator.run(pool).await?;

    tracing::info!(migrations = migrator.iter().count(), "Schema up to date");
    Ok(())
}

pub async fn check_health(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(DbError::Unreachable)?;
    Ok(())
}
