//! Response DTOs for the meme API
//!
//! Defines the structure of outgoing HTTP response bodies other than records.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Feed lookups that hit a live entry
    pub hits: u64,
    /// Feed lookups that missed
    pub misses: u64,
    /// Feeds evicted to respect the feed bound
    pub evictions: u64,
    /// Feeds dropped after their TTL
    pub expirations: u64,
    /// Times the aggregate view was rebuilt
    pub aggregate_rebuilds: u64,
    /// Feeds currently held
    pub total_feeds: usize,
    /// Records currently held
    pub total_records: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Live feeds, most recently written first
    pub feeds: Vec<String>,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(stats: CacheStats, feeds: Vec<String>) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            aggregate_rebuilds: stats.aggregate_rebuilds,
            total_feeds: stats.total_feeds,
            total_records: stats.total_records,
            feeds,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
