//! Database pool construction

use crate::config::DatabaseConfig;
use crate::error::AppResult;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Build the PostgreSQL connection pool from configuration.
pub async fn create_pool(config: &DatabaseConfig) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await?;

    Ok(pool)
}
