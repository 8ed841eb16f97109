//! Feed Cache Module
//!
//! Main cache engine: feed key → bounded record queue, with whole-entry TTL,
//! least-recently-written eviction and a memoized aggregate view.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::cache::{
    AggregateView, CacheEntry, CacheStats, EncodedRecord, FeedQueue, Snapshot, WriteOrder,
};
use crate::clock::{SharedClock, SystemClock};
use crate::config::Config;

// == Feed Cache ==
/// In-memory store of per-feed record queues.
///
/// Expired entries behave exactly like missing ones; they are dropped lazily
/// on access and by [`FeedCache::purge_expired`].
#[derive(Debug)]
pub struct FeedCache {
    entries: HashMap<String, CacheEntry>,
    order: WriteOrder,
    aggregate: AggregateView,
    /// Feeds never included in the aggregate
    aggregate_exclude: HashSet<String>,
    stats: CacheStats,
    max_feeds: usize,
    ttl_ms: u64,
    queue_capacity: usize,
    clock: SharedClock,
}

impl FeedCache {
    // == Constructor ==
    /// Creates an empty cache on the system clock.
    ///
    /// The aggregate view shares the entry TTL until [`FeedCache::with_aggregate`]
    /// says otherwise.
    ///
    /// # Arguments
    /// * `max_feeds` - Maximum number of feeds held at once
    /// * `ttl_secs` - Lifetime of an entry after its last write
    /// * `queue_capacity` - Maximum records per feed
    pub fn new(max_feeds: usize, ttl_secs: u64, queue_capacity: usize) -> Self {
        let ttl_ms = ttl_secs.saturating_mul(1000);
        Self {
            entries: HashMap::new(),
            order: WriteOrder::new(),
            aggregate: AggregateView::new(ttl_ms),
            aggregate_exclude: HashSet::new(),
            stats: CacheStats::new(),
            max_feeds,
            ttl_ms,
            queue_capacity,
            clock: Arc::new(SystemClock),
        }
    }

    /// Creates a cache from service configuration.
    pub fn from_config(config: &Config, clock: SharedClock) -> Self {
        Self::new(config.max_feeds, config.cache_ttl, config.queue_capacity)
            .with_clock(clock)
            .with_aggregate(config.aggregate_ttl, config.aggregate_exclude.iter().cloned())
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the aggregate TTL and the feeds left out of it.
    pub fn with_aggregate(
        mut self,
        ttl_secs: u64,
        exclude: impl IntoIterator<Item = String>,
    ) -> Self {
        self.aggregate = AggregateView::new(ttl_secs.saturating_mul(1000));
        self.aggregate_exclude = exclude.into_iter().map(|k| k.to_lowercase()).collect();
        self
    }

    // == Get ==
    /// Returns the live queue for `key`.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<&FeedQueue> {
        let now = self.clock.now_ms();

        match self.entries.get(key).map(|e| e.is_expired(now)) {
            None => {
                self.stats.record_miss();
                None
            }
            Some(true) => {
                self.remove_entry(key);
                self.stats.record_expirations(1);
                self.stats.record_miss();
                None
            }
            Some(false) => {
                self.stats.record_hit();
                self.entries.get(key).map(|e| &e.queue)
            }
        }
    }

    // == Put ==
    /// Inserts or replaces the queue for `key`, restarting its TTL.
    ///
    /// If `key` is new and the cache is full, the least recently written feed
    /// is evicted first.
    pub fn put(&mut self, key: String, queue: FeedQueue) {
        let now = self.clock.now_ms();

        if !self.entries.contains_key(&key) {
            self.make_room();
        }

        self.entries
            .insert(key.clone(), CacheEntry::new(queue, now, self.ttl_ms));
        self.order.touch(&key);
        self.aggregate.invalidate();
    }

    // == Merge ==
    /// Pushes `records` onto the front of `key`'s queue, in the given order, so
    /// the last record ends up newest.
    ///
    /// A missing or expired entry is replaced by a fresh queue. The entry's TTL
    /// restarts. Nothing is created when there is nothing to insert and no live
    /// entry. Returns the number of records inserted.
    pub fn merge<I>(&mut self, key: &str, records: I) -> usize
    where
        I: IntoIterator<Item = EncodedRecord>,
    {
        let now = self.clock.now_ms();
        let live = self
            .entries
            .get(key)
            .is_some_and(|e| !e.is_expired(now));
        let mut records = records.into_iter().peekable();

        if !live {
            if self.entries.contains_key(key) {
                self.remove_entry(key);
                self.stats.record_expirations(1);
            }
            if records.peek().is_none() {
                return 0;
            }
            self.put(key.to_string(), FeedQueue::new(self.queue_capacity));
        }

        let mut inserted = 0;
        if let Some(entry) = self.entries.get_mut(key) {
            for record in records {
                entry.queue.push_front(record);
                inserted += 1;
            }
            entry.restamp(now, self.ttl_ms);
        }

        self.order.touch(key);
        self.aggregate.invalidate();
        inserted
    }

    // == Keys ==
    /// Returns every live feed key, most recently written first.
    pub fn keys(&self) -> Vec<String> {
        let now = self.clock.now_ms();
        self.order
            .iter()
            .filter(|k| self.entries.get(*k).is_some_and(|e| !e.is_expired(now)))
            .cloned()
            .collect()
    }

    // == All Records ==
    /// Returns the aggregate of every live, non-excluded queue.
    ///
    /// The result is memoized and rebuilt after its TTL lapses, after any
    /// contributing entry expires, or after any write.
    pub fn all_records(&mut self) -> Snapshot {
        let now = self.clock.now_ms();
        if let Some(snapshot) = self.aggregate.current(now) {
            return snapshot;
        }

        let mut records = Vec::new();
        let mut earliest_expiry: Option<u64> = None;

        for key in self.order.iter() {
            if self.aggregate_exclude.contains(&key.to_lowercase()) {
                continue;
            }
            let Some(entry) = self.entries.get(key) else {
                continue;
            };
            if entry.is_expired(now) {
                continue;
            }
            records.extend(entry.queue.iter().cloned());
            earliest_expiry = Some(earliest_expiry.map_or(entry.expires_at, |e| e.min(entry.expires_at)));
        }

        self.stats.record_aggregate_rebuild();
        self.aggregate.store(records, now, earliest_expiry)
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }

        self.stats.record_expirations(expired.len());
        expired.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_feeds = self.entries.len();
        stats.total_records = self.entries.values().map(|e| e.queue.len()).sum();
        stats
    }

    /// Number of entries held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` has a live entry holding at least one record.
    ///
    /// Unlike [`FeedCache::get`], this neither touches the stats nor drops
    /// expired entries.
    pub fn has_records(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .is_some_and(|e| !e.is_expired(now) && !e.queue.is_empty())
    }

    fn make_room(&mut self) {
        while self.entries.len() >= self.max_feeds.max(1) {
            match self.order.evict_oldest() {
                Some(evicted) => {
                    self.entries.remove(&evicted);
                    self.stats.record_eviction();
                    tracing::debug!(feed = %evicted, "evicted least recently written feed");
                }
                None => break,
            }
        }
    }

    fn remove_entry(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.order.remove(key);
            self.aggregate.invalidate();
        }
    }
}
