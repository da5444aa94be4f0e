//! Catalog Cache - a product catalog behind a two-tier cache
//!
//! Reads go through an in-process L1 cache and a shared Redis L2 cache
//! before reaching the product store; writes hit the store and invalidate
//! both tiers.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_cache::api::create_router;
use catalog_cache::repository::{seed_products, InMemoryProductRepository};
use catalog_cache::{spawn_cleanup_task, AppState, Config};

/// Main entry point for the catalog server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the store, the L2 client (connected lazily) and the L1 caches
/// 4. Seed demo products into the empty store
/// 5. Start background L1 purge task
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Catalog Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, key_prefix={}, default_ttl={}s, product_ttl={}s, all_products_ttl={}s, port={}",
        config.cache_backend,
        config.key_prefix,
        config.default_ttl,
        config.product_ttl,
        config.all_products_ttl,
        config.server_port
    );

    let repository = Arc::new(InMemoryProductRepository::new());
    if config.seed_data {
        seed_products(repository.as_ref())
            .await
            .context("seeding demo products")?;
    }

    let state = AppState::from_config(&config, repository)
        .context("configuring the distributed cache")?;
    info!("Cache tiers initialized");

    let cleanup_handle = spawn_cleanup_task(state.local.clone(), config.cleanup_interval);
    info!("Background L1 purge task started");

    let shutdown = state.shutdown.clone();
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle, shutdown))
        .await
        .context("serving HTTP")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, cancels in-flight cache and store calls and aborts
/// the purge task.
async fn shutdown_signal(
    cleanup_handle: tokio::task::JoinHandle<()>,
    shutdown: tokio_util::sync::CancellationToken,
) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    shutdown.cancel();
    cleanup_handle.abort();
    warn!("L1 purge task aborted");
}
