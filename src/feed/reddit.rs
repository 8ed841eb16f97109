//! Reddit Source
//!
//! `FeedSource` backed by Reddit's public JSON listings.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::cache::ContentRecord;
use crate::config::Config;
use crate::error::{MemeError, Result};
use crate::feed::{FeedSource, Listing};

/// Fetches `hot` listings over HTTP.
#[derive(Debug, Clone)]
pub struct RedditSource {
    client: Client,
    url_template: String,
    limit: u32,
}

impl RedditSource {
    /// Creates a source with its own HTTP client.
    ///
    /// # Arguments
    /// * `url_template` - URL with `{feed}` and optionally `{limit}` placeholders
    /// * `limit` - Posts requested per fetch
    /// * `user_agent` - User-Agent header value
    /// * `timeout` - Per-request timeout
    pub fn new(
        url_template: impl Into<String>,
        limit: u32,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| MemeError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url_template: url_template.into(),
            limit,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.feed_url_template.clone(),
            config.fetch_limit,
            &config.user_agent,
            Duration::from_secs(config.fetch_timeout),
        )
    }

    /// Listing URL for `feed`.
    pub fn url_for(&self, feed: &str) -> String {
        self.url_template
            .replace("{feed}", feed)
            .replace("{limit}", &self.limit.to_string())
    }
}

#[async_trait]
impl FeedSource for RedditSource {
    async fn fetch(&self, feed: &str) -> Result<Vec<ContentRecord>> {
        let url = self.url_for(feed);
        debug!(%url, "fetching feed");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MemeError::fetch(feed, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MemeError::fetch(feed, format!("upstream returned {status}")));
        }

        let listing: Listing = response
            .json()
            .await
            .map_err(|e| MemeError::fetch(feed, format!("malformed listing: {e}")))?;

        Ok(listing.into_records(feed))
    }
}
