//! Pool construction and schema migration.

use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};

/// Pause between connection attempts.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Connect to Postgres, retrying up to `attempts` times, then apply the
/// embedded migrations.
pub async fn connect_with_retry(
    database_url: &str,
    max_connections: u32,
    attempts: u32,
) -> anyhow::Result<PgPool> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) if attempt < attempts => {
                warn!(attempt, attempts, error = %e, "database not reachable, retrying");
                tokio::time::sleep(RETRY_DELAY).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("unable to connect to database after {attempts} attempts")
                })
            }
        }
    };
    info!(attempt, "connected to database");

    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("failed to apply migrations")?;
    info!("database migrations applied");
    Ok(())
}
