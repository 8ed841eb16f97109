//! Aggregate View Module
//!
//! Memoized flattening of every live feed queue, used for cross-feed selection.

use std::sync::Arc;

use crate::cache::EncodedRecord;

/// A computed aggregate, shared with readers outside the cache lock.
pub type Snapshot = Arc<Vec<EncodedRecord>>;

// == Aggregate View ==
/// Cached snapshot with its own TTL.
///
/// A snapshot is valid until the earlier of its build time plus the TTL and
/// the first expiry among the entries it was built from.
#[derive(Debug)]
pub struct AggregateView {
    snapshot: Option<Snapshot>,
    valid_until: u64,
    ttl_ms: u64,
}

impl AggregateView {
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            snapshot: None,
            valid_until: 0,
            ttl_ms,
        }
    }

    // == Current ==
    /// Returns the memoized snapshot if it is still valid at `now_ms`.
    pub fn current(&self, now_ms: u64) -> Option<Snapshot> {
        match &self.snapshot {
            Some(snapshot) if now_ms < self.valid_until => Some(Arc::clone(snapshot)),
            _ => None,
        }
    }

    // == Store ==
    /// Memoizes a freshly computed snapshot.
    ///
    /// `earliest_expiry` is the first expiry among the contributing entries.
    pub fn store(
        &mut self,
        records: Vec<EncodedRecord>,
        now_ms: u64,
        earliest_expiry: Option<u64>,
    ) -> Snapshot {
        let by_ttl = now_ms.saturating_add(self.ttl_ms);
        let snapshot = Arc::new(records);

        self.valid_until = earliest_expiry.map_or(by_ttl, |e| e.min(by_ttl));
        self.snapshot = Some(Arc::clone(&snapshot));
        snapshot
    }

    // == Invalidate ==
    /// Drops the memoized snapshot so the next read recomputes it.
    pub fn invalidate(&mut self) {
        self.snapshot = None;
    }
}
