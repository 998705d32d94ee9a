//! catalog_server: REST server for the movie catalog.
//!
//! Configuration comes from flags, environment variables and an optional
//! `.env` file; see `catalog_server --help`.

use std::sync::Arc;

use anyhow::Context;
use catalog_core::service::{CatalogService, CatalogServiceImpl};
use catalog_postgres::{connect_with_retry, PgStores};
use catalog_server::auth::JwtAuthority;
use catalog_server::config::{LogMode, ServerConfig};
use catalog_server::router::build_router;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ServerConfig::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.default_log_filter().into());
    match config.log {
        LogMode::Debug => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogMode::Prod => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_target(false)
            .init(),
    }

    tracing::info!(
        host = %config.dbhost,
        port = config.dbport,
        db = %config.dbname,
        "connecting to database"
    );
    let pool = connect_with_retry(
        &config.database_url(),
        config.db_max_connections,
        config.db_connect_attempts,
    )
    .await?;

    let repos = PgStores::new(pool).into_repositories();
    let authority = Arc::new(JwtAuthority::from_secret(config.jwt_secret.as_bytes()));
    let service: Arc<dyn CatalogService> = Arc::new(CatalogServiceImpl::new(repos, authority));

    let app = build_router(service);

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;
    tracing::info!("catalog_server listening on {bind_addr}");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
