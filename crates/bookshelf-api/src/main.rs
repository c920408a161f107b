//! # bookshelf-api: Binary Entry Point
//!
//! Starts the Axum HTTP server for the book catalog. Configuration comes
//! from the environment; see [`AppConfig::from_env`].

use std::sync::Arc;

use bookshelf_api::db::{PgAccountStore, PgRecordStore};
use bookshelf_api::state::{AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {e}");
        e
    })?;
    tracing::info!(?config, "configuration loaded");

    let port = config.port;
    let state = match config.database_url.clone() {
        Some(url) => {
            let pool = bookshelf_api::db::init_pool(&url).await.map_err(|e| {
                tracing::error!("Database initialization failed: {e}");
                e
            })?;
            AppState::with_stores(
                config,
                Arc::new(PgRecordStore::new(pool.clone())),
                Arc::new(PgAccountStore::new(pool)),
            )?
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store, data is lost on restart");
            AppState::in_memory(config)?
        }
    };

    let app = bookshelf_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Bookshelf API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
