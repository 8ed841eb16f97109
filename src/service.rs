//! Meme Service
//!
//! Ties the feed cache to a feed source: refreshes feeds into the cache and
//! draws random records back out of it.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::cache::{ContentRecord, EncodedRecord, FeedCache, FeedQueue, Snapshot};
use crate::clock::SharedClock;
use crate::config::Config;
use crate::error::{MemeError, Result};
use crate::feed::FeedSource;

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_AMOUNT: usize = 100;

// == Selection ==
/// Result of a selection: a single record, or a list when an amount was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Selection {
    One(ContentRecord),
    Many(Vec<ContentRecord>),
}

impl Selection {
    /// Flattens the selection into a list of records.
    pub fn into_records(self) -> Vec<ContentRecord> {
        match self {
            Selection::One(record) => vec![record],
            Selection::Many(records) => records,
        }
    }
}

// == Refresh Report ==
/// Outcome of one refresh pass.
#[derive(Debug, Default, Clone)]
pub struct RefreshReport {
    /// Feeds fetched and merged successfully
    pub refreshed: Vec<String>,
    /// Feeds whose fetch failed, with the reason; their cached data is untouched
    pub failed: Vec<(String, String)>,
    /// Records merged across all feeds
    pub records_added: usize,
}

// == Meme Service ==
/// Shared handle over the cache and the upstream source.
#[derive(Clone)]
pub struct MemeService {
    cache: Arc<RwLock<FeedCache>>,
    source: Arc<dyn FeedSource>,
    feeds: Arc<[String]>,
    fetch_timeout: Duration,
    max_amount: usize,
}

impl MemeService {
    // == Constructor ==
    /// Creates a service refreshing `feeds` from `source` into `cache`.
    pub fn new(cache: FeedCache, source: Arc<dyn FeedSource>, feeds: Vec<String>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            source,
            feeds: feeds.into(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_amount: DEFAULT_MAX_AMOUNT,
        }
    }

    /// Builds the service and its cache from configuration.
    pub fn from_config(config: &Config, source: Arc<dyn FeedSource>, clock: SharedClock) -> Self {
        Self::new(
            FeedCache::from_config(config, clock),
            source,
            config.feeds.clone(),
        )
        .with_fetch_timeout(Duration::from_secs(config.fetch_timeout))
        .with_max_amount(config.max_amount)
    }

    /// Bounds each upstream fetch, including on-demand ones made for a caller.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_max_amount(mut self, max_amount: usize) -> Self {
        self.max_amount = max_amount;
        self
    }

    pub fn cache(&self) -> &Arc<RwLock<FeedCache>> {
        &self.cache
    }

    /// Feeds refreshed on every pass, in order.
    pub fn feeds(&self) -> &[String] {
        &self.feeds
    }

    // == Refresh Feed ==
    /// Fetches `feed` and merges its records at the front of its queue.
    ///
    /// The cache lock is not held while fetching; on failure nothing is written.
    /// Returns the number of records merged.
    pub async fn refresh_feed(&self, feed: &str) -> Result<usize> {
        let encoded = self.fetch_encoded(feed).await?;

        let merged = self.cache.write().await.merge(feed, encoded);
        debug!(feed, merged, "feed refreshed");
        Ok(merged)
    }

    /// Fetches `feed` within the fetch timeout and encodes its records.
    async fn fetch_encoded(&self, feed: &str) -> Result<Vec<EncodedRecord>> {
        let records = tokio::time::timeout(self.fetch_timeout, self.source.fetch(feed))
            .await
            .map_err(|_| {
                MemeError::fetch(feed, format!("timed out after {:?}", self.fetch_timeout))
            })??;

        Ok(keep_encoded(feed, records.iter().map(ContentRecord::encode)))
    }

    // == Refresh All ==
    /// Refreshes every configured feed, one after another.
    ///
    /// A failing feed is logged and skipped; the pass always completes.
    pub async fn refresh_all(&self) -> RefreshReport {
        let mut report = RefreshReport::default();

        for feed in self.feeds.iter() {
            info!(feed = %feed, "refreshing feed");
            match self.refresh_feed(feed).await {
                Ok(merged) => {
                    report.records_added += merged;
                    report.refreshed.push(feed.clone());
                }
                Err(e) => {
                    warn!(feed = %feed, error = %e, "feed refresh failed, keeping cached data");
                    report.failed.push((feed.clone(), e.to_string()));
                }
            }
        }

        let pooled = self.cache.write().await.all_records().len();
        info!(
            refreshed = report.refreshed.len(),
            failed = report.failed.len(),
            added = report.records_added,
            pooled,
            "refresh pass complete"
        );
        report
    }

    // == Random ==
    /// Returns one uniformly random record, from `feed` if given, else from every feed.
    pub async fn random(&self, feed: Option<&str>) -> Result<ContentRecord> {
        let pool = match feed {
            Some(feed) => self.feed_pool(feed).await?,
            None => self.aggregate_pool().await,
        };
        draw_one(&pool, &mut rand::thread_rng())
    }

    // == Sample Feed ==
    /// Draws `count` records from `feed`, with replacement.
    pub async fn sample_feed(&self, feed: &str, count: usize) -> Result<Vec<ContentRecord>> {
        self.check_amount(count)?;
        let pool = self.feed_pool(feed).await?;
        draw_many(&pool, count, &mut rand::thread_rng())
    }

    // == Sample All ==
    /// Draws `count` records from the aggregate of every feed, with replacement.
    pub async fn sample_all(&self, count: usize) -> Result<Vec<ContentRecord>> {
        self.check_amount(count)?;
        let pool = self.aggregate_pool().await;
        draw_many(&pool, count, &mut rand::thread_rng())
    }

    // == Select ==
    /// Single entry point used by the HTTP layer.
    ///
    /// - no amount (or zero): one record
    /// - an amount: that many draws, from `feed` when given, else from every feed
    pub async fn select(&self, feed: Option<&str>, amount: Option<usize>) -> Result<Selection> {
        match (feed, amount.filter(|n| *n > 0)) {
            (feed, None) => self.random(feed).await.map(Selection::One),
            (Some(feed), Some(count)) => self.sample_feed(feed, count).await.map(Selection::Many),
            (None, Some(count)) => self.sample_all(count).await.map(Selection::Many),
        }
    }

    /// Records of `feed`, fetching it first if it is missing, expired or empty.
    ///
    /// Concurrent callers may fetch the same feed; only the first result to
    /// reach the cache is merged.
    async fn feed_pool(&self, feed: &str) -> Result<Snapshot> {
        if let Some(pool) = self.snapshot_feed(feed).await.filter(|p| !p.is_empty()) {
            return Ok(pool);
        }

        info!(feed, "feed not cached, fetching on demand");
        let encoded = self.fetch_encoded(feed).await?;

        let mut cache = self.cache.write().await;
        if cache.has_records(feed) {
            debug!(feed, "feed filled by a concurrent request, discarding fetched records");
        } else {
            let merged = cache.merge(feed, encoded);
            debug!(feed, merged, "feed refreshed on demand");
        }
        // Evicted again in the meantime counts as empty.
        let pool = cache.get(feed).map(snapshot_of).unwrap_or_default();
        Ok(pool)
    }

    async fn snapshot_feed(&self, feed: &str) -> Option<Snapshot> {
        self.cache.write().await.get(feed).map(snapshot_of)
    }

    async fn aggregate_pool(&self) -> Snapshot {
        self.cache.write().await.all_records()
    }

    fn check_amount(&self, count: usize) -> Result<()> {
        if count > self.max_amount {
            return Err(MemeError::InvalidRequest(format!(
                "amount must be at most {}",
                self.max_amount
            )));
        }
        Ok(())
    }
}

/// Copies a queue out of the cache, sharing the record bytes.
fn snapshot_of(queue: &FeedQueue) -> Snapshot {
    Arc::new(queue.iter().cloned().collect())
}

/// Keeps the records that encoded, logging the ones that did not.
fn keep_encoded<I>(feed: &str, encoded: I) -> Vec<EncodedRecord>
where
    I: IntoIterator<Item = Result<EncodedRecord>>,
{
    encoded
        .into_iter()
        .filter_map(|result| match result {
            Ok(record) => Some(record),
            Err(e) => {
                error!(feed, error = %e, "dropping record that failed to encode");
                None
            }
        })
        .collect()
}

// == Drawing ==
/// Picks one record uniformly at random and decodes it.
///
/// A record that fails to decode is logged and the draw is repeated over the
/// records not yet tried; only a pool with no decodable record is empty.
fn draw_one<R: Rng + ?Sized>(pool: &[EncodedRecord], rng: &mut R) -> Result<ContentRecord> {
    if pool.is_empty() {
        return Err(MemeError::EmptyPool);
    }

    let first = rng.gen_range(0..pool.len());
    match ContentRecord::decode(&pool[first]) {
        Ok(record) => return Ok(record),
        Err(e) => warn!(index = first, error = %e, "skipping corrupt cached record"),
    }

    let mut untried: Vec<usize> = (0..pool.len()).filter(|&i| i != first).collect();
    while !untried.is_empty() {
        let index = untried.swap_remove(rng.gen_range(0..untried.len()));
        match ContentRecord::decode(&pool[index]) {
            Ok(record) => return Ok(record),
            Err(e) => warn!(index, error = %e, "skipping corrupt cached record"),
        }
    }

    Err(MemeError::EmptyPool)
}

/// Draws `count` records independently (with replacement).
fn draw_many<R: Rng + ?Sized>(
    pool: &[EncodedRecord],
    count: usize,
    rng: &mut R,
) -> Result<Vec<ContentRecord>> {
    (0..count).map(|_| draw_one(pool, rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const TTL_SECS: u64 = 3600;

    fn post(feed: &str, n: i64) -> ContentRecord {
        ContentRecord {
            title: format!("{feed} post {n}"),
            author: format!("user{n}"),
            source: feed.to_string(),
            post_link: format!("https://reddit.com/r/{feed}/comments/{n}/"),
            score: n,
            media_url: Some(format!("https://i.redd.it/{n}.png")),
        }
    }

    /// Source serving canned posts; feeds without an entry fail.
    #[derive(Default)]
    struct FakeSource {
        posts: Mutex<HashMap<String, Vec<ContentRecord>>>,
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl FakeSource {
        fn with(feeds: &[(&str, usize)]) -> Self {
            let source = Self::default();
            for (feed, count) in feeds {
                source.set(feed, (0..*count as i64).map(|n| post(feed, n)).collect());
            }
            source
        }

        fn set(&self, feed: &str, posts: Vec<ContentRecord>) {
            self.posts.lock().unwrap().insert(feed.to_string(), posts);
        }

        fn fail(&self, feed: &str) {
            self.posts.lock().unwrap().remove(feed);
        }
    }

    #[async_trait]
    impl FeedSource for FakeSource {
        async fn fetch(&self, feed: &str) -> Result<Vec<ContentRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.posts
                .lock()
                .unwrap()
                .get(feed)
                .cloned()
                .ok_or_else(|| MemeError::fetch(feed, "upstream returned 503 Service Unavailable"))
        }
    }

    fn service(source: Arc<FakeSource>, feeds: &[&str]) -> (MemeService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let cache = FeedCache::new(100, TTL_SECS, 1024).with_clock(clock.clone());
        let feeds = feeds.iter().map(|f| f.to_string()).collect();
        (MemeService::new(cache, source, feeds), clock)
    }

    async fn scores(service: &MemeService, feed: &str) -> Vec<i64> {
        let mut cache = service.cache().write().await;
        cache
            .get(feed)
            .map(|q| q.iter().map(|r| ContentRecord::decode(r).unwrap().score).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_refresh_then_select_from_feed() {
        let source = Arc::new(FakeSource::with(&[("memes", 5)]));
        let (service, _) = service(source, &["memes"]);

        let report = service.refresh_all().await;
        assert_eq!(report.refreshed, vec!["memes".to_string()]);
        assert_eq!(report.records_added, 5);

        let expected: Vec<ContentRecord> = (0..5).map(|n| post("memes", n)).collect();

        let one = service.select(Some("memes"), None).await.unwrap();
        assert!(matches!(&one, Selection::One(r) if expected.contains(r)));

        let many = service.select(Some("memes"), Some(3)).await.unwrap().into_records();
        assert_eq!(many.len(), 3);
        assert!(many.iter().all(|r| expected.contains(r)));
    }

    #[tokio::test]
    async fn test_refresh_pass_isolates_failures() {
        let source = Arc::new(FakeSource::with(&[("a", 2), ("b", 2)]));
        let (service, _) = service(source.clone(), &["a", "b"]);
        service.refresh_all().await;
        let before_a = scores(&service, "a").await;

        source.fail("a");
        source.set("b", vec![post("b", 10), post("b", 11)]);
        let report = service.refresh_all().await;

        assert_eq!(report.refreshed, vec!["b".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "a");
        assert_eq!(scores(&service, "a").await, before_a, "failed feed left untouched");
        assert_eq!(scores(&service, "b").await, vec![11, 10, 1, 0]);
    }

    #[tokio::test]
    async fn test_select_all_with_only_expired_entries_is_empty() {
        let source = Arc::new(FakeSource::with(&[("memes", 3)]));
        let (service, clock) = service(source.clone(), &["memes"]);
        service.refresh_all().await;
        let calls = source.calls.load(Ordering::SeqCst);

        clock.advance(Duration::from_secs(TTL_SECS + 1));

        let result = service.select(None, None).await;
        assert!(matches!(result, Err(MemeError::EmptyPool)));
        assert!(matches!(service.select(None, Some(2)).await, Err(MemeError::EmptyPool)));
        assert_eq!(source.calls.load(Ordering::SeqCst), calls, "no automatic refresh");
    }

    #[tokio::test]
    async fn test_select_unknown_feed_refreshes_on_demand() {
        let source = Arc::new(FakeSource::with(&[("unknown", 4)]));
        let (service, _) = service(source.clone(), &["memes"]);

        let record = service.random(Some("unknown")).await.unwrap();
        assert_eq!(record.source, "unknown");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        // Cached now: no second fetch.
        service.random(Some("unknown")).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_select_expired_feed_refreshes_on_demand() {
        let source = Arc::new(FakeSource::with(&[("memes", 2)]));
        let (service, clock) = service(source.clone(), &["memes"]);
        service.refresh_all().await;

        clock.advance(Duration::from_secs(TTL_SECS));
        service.random(Some("memes")).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_on_demand_failure_surfaces_fetch_error() {
        let source = Arc::new(FakeSource::default());
        let (service, _) = service(source, &[]);

        let result = service.random(Some("missing")).await;
        assert!(matches!(result, Err(MemeError::Fetch { feed, .. }) if feed == "missing"));
    }

    #[tokio::test]
    async fn test_on_demand_fetch_is_bounded() {
        let source = Arc::new(FakeSource {
            delay: Some(Duration::from_secs(30)),
            ..FakeSource::with(&[("slow", 1)])
        });
        let (service, _) = service(source, &[]);
        let service = service.with_fetch_timeout(Duration::from_millis(50));

        let result = service.random(Some("slow")).await;
        assert!(matches!(result, Err(MemeError::Fetch { reason, .. }) if reason.contains("timed out")));
        assert!(service.cache().write().await.get("slow").is_none());
    }

    #[tokio::test]
    async fn test_empty_upstream_listing_yields_empty_pool() {
        let source = Arc::new(FakeSource::with(&[("quiet", 0)]));
        let (service, _) = service(source, &[]);

        assert!(matches!(service.random(Some("quiet")).await, Err(MemeError::EmptyPool)));
        assert!(service.cache().read().await.is_empty(), "no entry for an empty listing");
    }

    #[tokio::test]
    async fn test_empty_listing_is_fetched_again_next_time() {
        let source = Arc::new(FakeSource::with(&[("quiet", 0)]));
        let (service, _) = service(source.clone(), &[]);

        assert!(matches!(service.random(Some("quiet")).await, Err(MemeError::EmptyPool)));

        source.set("quiet", vec![post("quiet", 1)]);
        let record = service.random(Some("quiet")).await.unwrap();

        assert_eq!(record, post("quiet", 1));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_refresh_pass_leaves_feed_fetchable() {
        let source = Arc::new(FakeSource::with(&[("quiet", 0)]));
        let (service, _) = service(source.clone(), &["quiet"]);
        service.refresh_all().await;

        source.set("quiet", vec![post("quiet", 3)]);
        assert_eq!(service.random(Some("quiet")).await.unwrap().score, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_on_demand_requests_merge_once() {
        let source = Arc::new(FakeSource {
            delay: Some(Duration::from_secs(1)),
            ..FakeSource::with(&[("fresh", 3)])
        });
        let (service, _) = service(source.clone(), &[]);

        let (first, second) = tokio::join!(
            service.random(Some("fresh")),
            service.random(Some("fresh"))
        );

        assert_eq!(first.unwrap().source, "fresh");
        assert_eq!(second.unwrap().source, "fresh");
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(scores(&service, "fresh").await, vec![2, 1, 0]);
    }

    #[tokio::test]
    async fn test_sample_all_spans_feeds() {
        let source = Arc::new(FakeSource::with(&[("a", 1), ("b", 1)]));
        let (service, _) = service(source, &["a", "b"]);
        service.refresh_all().await;

        let drawn = service.sample_all(100).await.unwrap();
        assert_eq!(drawn.len(), 100);
        assert!(drawn.iter().any(|r| r.source == "a"));
        assert!(drawn.iter().any(|r| r.source == "b"));
    }

    #[tokio::test]
    async fn test_sample_feed_stays_within_feed() {
        let source = Arc::new(FakeSource::with(&[("a", 3), ("b", 3)]));
        let (service, _) = service(source, &["a", "b"]);
        service.refresh_all().await;

        let drawn = service.sample_feed("b", 20).await.unwrap();
        assert!(drawn.iter().all(|r| r.source == "b"));
    }

    #[tokio::test]
    async fn test_amount_above_limit_rejected() {
        let source = Arc::new(FakeSource::with(&[("a", 3)]));
        let (service, _) = service(source, &["a"]);
        let service = service.with_max_amount(5);

        let result = service.select(None, Some(6)).await;
        assert!(matches!(result, Err(MemeError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_zero_amount_returns_single_record() {
        let source = Arc::new(FakeSource::with(&[("a", 3)]));
        let (service, _) = service(source, &["a"]);
        service.refresh_all().await;

        let selection = service.select(None, Some(0)).await.unwrap();
        assert!(matches!(selection, Selection::One(_)));
    }

    #[test]
    fn test_draw_skips_corrupt_records() {
        let pool: Vec<EncodedRecord> = vec![
            vec![0xff, 0x01].into(),
            post("memes", 7).encode().unwrap(),
            vec![0x00].into(),
        ];
        let mut rng = rand::thread_rng();

        for _ in 0..20 {
            assert_eq!(draw_one(&pool, &mut rng).unwrap().score, 7);
        }
    }

    #[test]
    fn test_draw_after_corrupt_record_stays_uniform() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let pool: Vec<EncodedRecord> = vec![
            vec![0xff].into(),
            post("memes", 1).encode().unwrap(),
            post("memes", 2).encode().unwrap(),
        ];
        let mut rng = StdRng::seed_from_u64(7);

        let draws = 3000;
        let ones = (0..draws)
            .filter(|_| draw_one(&pool, &mut rng).unwrap().score == 1)
            .count();

        // An even split is 1500; a record after the corrupt one is not favoured.
        assert!((1300..=1700).contains(&ones), "got {ones} of {draws}");
    }

    #[test]
    fn test_records_failing_to_encode_are_dropped() {
        let encoded = vec![
            post("memes", 1).encode(),
            Err(MemeError::Internal("failed to encode record".to_string())),
            post("memes", 2).encode(),
        ];

        let kept = keep_encoded("memes", encoded);

        let scores: Vec<i64> = kept
            .iter()
            .map(|r| ContentRecord::decode(r).unwrap().score)
            .collect();
        assert_eq!(scores, vec![1, 2]);
    }

    #[test]
    fn test_draw_from_all_corrupt_pool_is_empty() {
        let pool: Vec<EncodedRecord> = vec![vec![0xff].into()];
        let result = draw_one(&pool, &mut rand::thread_rng());
        assert!(matches!(result, Err(MemeError::EmptyPool)));
    }

    #[test]
    fn test_draw_from_empty_pool() {
        let result = draw_many(&[], 3, &mut rand::thread_rng());
        assert!(matches!(result, Err(MemeError::EmptyPool)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        // Every sampled record comes from the refreshed feed, and the count is exact.
        #[test]
        fn prop_samples_come_from_pool(size in 1usize..20, count in 1usize..50) {
            let source = Arc::new(FakeSource::with(&[("memes", size)]));
            let (service, _) = service(source, &["memes"]);

            let drawn = tokio_test::block_on(async {
                service.refresh_all().await;
                service.sample_feed("memes", count).await
            })
            .unwrap();

            prop_assert_eq!(drawn.len(), count);
            prop_assert!(drawn.iter().all(|r| r.source == "memes" && r.score < size as i64));
        }
    }
}
