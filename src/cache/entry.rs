//! Cache Entry Module
//!
//! Defines the structure for a feed's cache entry with TTL support.

use crate::cache::FeedQueue;

// == Cache Entry ==
/// A feed's record queue plus its expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The feed's records
    pub queue: FeedQueue,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry written at `now_ms` that lives for `ttl_ms`.
    pub fn new(queue: FeedQueue, now_ms: u64, ttl_ms: u64) -> Self {
        Self {
            queue,
            expires_at: now_ms.saturating_add(ttl_ms),
        }
    }

    // == Restamp ==
    /// Marks the entry as written at `now_ms`, restarting its TTL.
    pub fn restamp(&mut self, now_ms: u64, ttl_ms: u64) {
        self.expires_at = now_ms.saturating_add(ttl_ms);
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: the entry is expired once `now_ms` reaches the
    /// expiration time.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(FeedQueue::new(8), 1_000, 500);

        assert_eq!(entry.expires_at, 1_500);
        assert!(!entry.is_expired(1_000));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new(FeedQueue::new(8), 1_000, 500);

        assert!(!entry.is_expired(1_499));
        assert!(entry.is_expired(1_500), "Entry should be expired at boundary");
        assert!(entry.is_expired(1_501));
    }

    #[test]
    fn test_restamp_extends_life() {
        let mut entry = CacheEntry::new(FeedQueue::new(8), 1_000, 500);
        entry.restamp(1_400, 500);

        assert!(!entry.is_expired(1_600));
        assert!(entry.is_expired(1_900));
    }

    #[test]
    fn test_ttl_does_not_overflow() {
        let entry = CacheEntry::new(FeedQueue::new(8), u64::MAX - 10, 500);
        assert_eq!(entry.expires_at, u64::MAX);
    }
}
