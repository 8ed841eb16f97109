//! Meme API - random posts from a periodically refreshed feed cache

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meme_api::api::create_router;
use meme_api::feed::RedditSource;
use meme_api::{spawn_cleanup_task, spawn_refresh_task, AppState, Config};

/// Main entry point for the meme API server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the upstream source, cache and service
/// 4. Start the feed refresh task (first pass runs immediately) and the TTL sweep
/// 5. Serve the Axum router on the configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meme_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting meme API server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: feeds={:?}, cache_ttl={}s, queue_capacity={}, max_feeds={}, refresh_interval={}s, port={}",
        config.feeds,
        config.cache_ttl,
        config.queue_capacity,
        config.max_feeds,
        config.refresh_interval,
        config.server_port
    );

    let source = RedditSource::from_config(&config).context("failed to create feed source")?;
    let state = AppState::from_config(&config, Arc::new(source));

    let refresh_handle = spawn_refresh_task(state.service.clone(), config.refresh_interval);
    let cleanup_handle = spawn_cleanup_task(state.service.cache().clone(), config.cleanup_interval);
    info!("Background tasks started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(vec![refresh_handle, cleanup_handle]))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then aborts the background tasks.
async fn shutdown_signal(tasks: Vec<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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

    for task in tasks {
        task.abort();
    }
    warn!("Background tasks aborted");
}
