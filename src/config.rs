//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Feeds refreshed by the background task when `FEEDS` is not set.
pub const DEFAULT_FEEDS: &[&str] = &[
    "memes",
    "dankmemes",
    "me_irl",
    "funny",
    "wholesomememes",
    "antimeme",
];

/// Upstream listing endpoint; `{feed}` and `{limit}` are substituted per request.
pub const DEFAULT_FEED_URL_TEMPLATE: &str = "https://www.reddit.com/r/{feed}/hot.json?limit={limit}";

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// None of them change after startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Feeds refreshed on every pass, in order
    pub feeds: Vec<String>,
    /// Seconds a feed entry lives after its last write
    pub cache_ttl: u64,
    /// Seconds the aggregate snapshot is reused before recomputation
    pub aggregate_ttl: u64,
    /// Maximum records held per feed
    pub queue_capacity: usize,
    /// Maximum number of feeds the cache can hold
    pub max_feeds: usize,
    /// Seconds between refresh passes
    pub refresh_interval: u64,
    /// Seconds between expiry sweeps
    pub cleanup_interval: u64,
    /// Upper bound in seconds for a single upstream fetch
    pub fetch_timeout: u64,
    /// Number of posts requested per fetch
    pub fetch_limit: u32,
    /// Upstream URL template
    pub feed_url_template: String,
    /// User-Agent sent upstream
    pub user_agent: String,
    /// Feeds kept out of the aggregate view
    pub aggregate_exclude: Vec<String>,
    /// Largest `amount` a caller may request
    pub max_amount: usize,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `FEEDS` - Comma separated feed list (default: see [`DEFAULT_FEEDS`])
    /// - `CACHE_TTL` - Feed entry TTL in seconds (default: 3600)
    /// - `AGGREGATE_TTL` - Aggregate snapshot TTL in seconds (default: 3600)
    /// - `QUEUE_CAPACITY` - Records per feed (default: 1024)
    /// - `MAX_FEEDS` - Maximum cached feeds (default: 100)
    /// - `REFRESH_INTERVAL` - Refresh frequency in seconds (default: 3600)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 60)
    /// - `FETCH_TIMEOUT` - Upstream timeout in seconds (default: 10)
    /// - `FETCH_LIMIT` - Posts per upstream request (default: 100)
    /// - `FEED_URL_TEMPLATE` - Upstream URL template
    /// - `USER_AGENT` - User-Agent header for upstream requests
    /// - `AGGREGATE_EXCLUDE` - Comma separated feeds left out of `GET /` (default: showerthoughts)
    /// - `MAX_AMOUNT` - Largest accepted `amount` (default: 100)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            feeds: env_list("FEEDS").unwrap_or(defaults.feeds),
            cache_ttl: env_parse("CACHE_TTL").unwrap_or(defaults.cache_ttl),
            aggregate_ttl: env_parse("AGGREGATE_TTL").unwrap_or(defaults.aggregate_ttl),
            queue_capacity: env_parse("QUEUE_CAPACITY").unwrap_or(defaults.queue_capacity),
            max_feeds: env_parse("MAX_FEEDS").unwrap_or(defaults.max_feeds),
            refresh_interval: env_parse("REFRESH_INTERVAL").unwrap_or(defaults.refresh_interval),
            cleanup_interval: env_parse("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            fetch_timeout: env_parse("FETCH_TIMEOUT").unwrap_or(defaults.fetch_timeout),
            fetch_limit: env_parse("FETCH_LIMIT").unwrap_or(defaults.fetch_limit),
            feed_url_template: env::var("FEED_URL_TEMPLATE").unwrap_or(defaults.feed_url_template),
            user_agent: env::var("USER_AGENT").unwrap_or(defaults.user_agent),
            aggregate_exclude: env_list("AGGREGATE_EXCLUDE").unwrap_or(defaults.aggregate_exclude),
            max_amount: env_parse("MAX_AMOUNT").unwrap_or(defaults.max_amount),
            server_port: env_parse("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feeds: DEFAULT_FEEDS.iter().map(|f| f.to_string()).collect(),
            cache_ttl: 3600,
            aggregate_ttl: 3600,
            queue_capacity: 1024,
            max_feeds: 100,
            refresh_interval: 3600,
            cleanup_interval: 60,
            fetch_timeout: 10,
            fetch_limit: 100,
            feed_url_template: DEFAULT_FEED_URL_TEMPLATE.to_string(),
            user_agent: concat!("meme_api/", env!("CARGO_PKG_VERSION")).to_string(),
            aggregate_exclude: vec!["showerthoughts".to_string()],
            max_amount: 100,
            server_port: 3000,
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Splits a comma separated variable, dropping blanks. An empty list counts as unset.
fn env_list(name: &str) -> Option<Vec<String>> {
    let items: Vec<String> = env::var(name)
        .ok()?
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.feeds.len(), DEFAULT_FEEDS.len());
        assert_eq!(config.cache_ttl, 3600);
        assert_eq!(config.queue_capacity, 1024);
        assert_eq!(config.max_feeds, 100);
        assert_eq!(config.refresh_interval, 3600);
        assert_eq!(config.aggregate_exclude, vec!["showerthoughts".to_string()]);
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_env_list_splits_and_trims() {
        env::set_var("MEME_API_TEST_LIST", " memes, ,funny ,");
        assert_eq!(
            env_list("MEME_API_TEST_LIST"),
            Some(vec!["memes".to_string(), "funny".to_string()])
        );

        env::set_var("MEME_API_TEST_LIST", " , ");
        assert_eq!(env_list("MEME_API_TEST_LIST"), None);
        env::remove_var("MEME_API_TEST_LIST");
    }

    #[test]
    fn test_env_parse_rejects_garbage() {
        env::set_var("MEME_API_TEST_NUM", "not-a-number");
        assert_eq!(env_parse::<u64>("MEME_API_TEST_NUM"), None);

        env::set_var("MEME_API_TEST_NUM", " 42 ");
        assert_eq!(env_parse::<u64>("MEME_API_TEST_NUM"), Some(42));
        env::remove_var("MEME_API_TEST_NUM");
    }
}
