//! Pool construction and migrations

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use stratus_core::Config;

/// Connect to Postgres with the configured pool limits and run pending
/// migrations.
pub async fn connect_pool(config: &Config) -> Result<PgPool, anyhow::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!(
        max_connections = config.db_max_connections,
        "Database pool ready"
    );

    Ok(pool)
}
