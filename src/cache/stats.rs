//! Cache Statistics Module
//!
//! Tracks feed cache metrics including hits, misses, evictions and expirations.

use serde::Serialize;

// == Cache Stats ==
/// Tracks feed cache metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups that found a live feed
    pub hits: u64,
    /// Lookups for a missing or expired feed
    pub misses: u64,
    /// Feeds evicted to make room for a new one
    pub evictions: u64,
    /// Feeds dropped because their TTL elapsed
    pub expirations: u64,
    /// Times the aggregate snapshot was rebuilt
    pub aggregate_rebuilds: u64,
    /// Feeds currently held (including not yet purged expired ones)
    pub total_feeds: usize,
    /// Encoded records currently held across all feeds
    pub total_records: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn record_aggregate_rebuild(&mut self) {
        self.aggregate_rebuilds += 1;
    }
}
