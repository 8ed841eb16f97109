//! API Handlers
//!
//! HTTP request handlers for each meme API endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::clock::SystemClock;
use crate::config::Config;
use crate::error::{MemeError, Result};
use crate::feed::FeedSource;
use crate::models::{validate_feed_key, HealthResponse, SelectQuery, StatsResponse};
use crate::service::{MemeService, Selection};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: MemeService,
}

impl AppState {
    pub fn new(service: MemeService) -> Self {
        Self { service }
    }

    /// Creates a new AppState from configuration, on the system clock.
    pub fn from_config(config: &Config, source: Arc<dyn FeedSource>) -> Self {
        Self::new(MemeService::from_config(config, source, Arc::new(SystemClock)))
    }
}

/// Handler for GET /
///
/// Returns one random record from every feed, or `amount` of them.
pub async fn random_handler(
    State(state): State<AppState>,
    Query(query): Query<SelectQuery>,
) -> Result<Json<Selection>> {
    let selection = state.service.select(None, query.amount).await?;
    Ok(Json(selection))
}

/// Handler for GET /:feed
///
/// Same as `GET /`, scoped to one feed; an uncached feed is fetched first.
pub async fn feed_handler(
    State(state): State<AppState>,
    Path(feed): Path<String>,
    Query(query): Query<SelectQuery>,
) -> Result<Json<Selection>> {
    if let Some(error_msg) = validate_feed_key(&feed) {
        return Err(MemeError::InvalidRequest(error_msg));
    }

    let selection = state.service.select(Some(&feed), query.amount).await?;
    Ok(Json(selection))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.service.cache().read().await;
    Json(StatsResponse::new(cache.stats(), cache.keys()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
