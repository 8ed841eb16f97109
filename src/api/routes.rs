//! API Routes
//!
//! Configures the Axum router with all meme API endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{feed_handler, health_handler, random_handler, stats_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Random record(s) from every feed
/// - `GET /:feed` - Random record(s) from one feed
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
///
/// Static routes win over `/:feed`, so feeds named `stats` or `health` are
/// not reachable by key.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(random_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .route("/:feed", get(feed_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
