//! HTTP server initialization and runtime setup.
//!
//! Handles the database pool, migrations, metadata fetcher selection and the
//! Axum server lifecycle.

use crate::config::Config;
use crate::infrastructure::metadata::{HttpMetadataFetcher, MetadataFetcher, NullMetadataFetcher};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Builds the PostgreSQL pool from the `DB_*` settings.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    Ok(pool)
}

/// Picks the page metadata fetcher used by link backfill.
///
/// Falls back to [`NullMetadataFetcher`] when fetching is disabled or the
/// HTTP client cannot be built.
pub fn metadata_fetcher(config: &Config) -> Arc<dyn MetadataFetcher> {
    if !config.metadata_fetch_enabled {
        tracing::info!("Metadata backfill disabled");
        return Arc::new(NullMetadataFetcher::new());
    }

    let timeout = Duration::from_secs(config.metadata_fetch_timeout_seconds);
    match HttpMetadataFetcher::new(timeout) {
        Ok(fetcher) => {
            tracing::info!("Metadata backfill enabled");
            Arc::new(fetcher)
        }
        Err(e) => {
            tracing::warn!("Failed to build metadata HTTP client: {}. Backfill disabled.", e);
            Arc::new(NullMetadataFetcher::new())
        }
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Metadata fetcher (or the no-op fallback)
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;

    let state = AppState::new(Arc::new(pool), &config, metadata_fetcher(&config));

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address: {}", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
