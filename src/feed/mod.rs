//! Feed Module
//!
//! Upstream feed access. The service only sees the [`FeedSource`] trait, so tests
//! can substitute canned or failing sources.

mod listing;
mod reddit;

use async_trait::async_trait;

use crate::cache::ContentRecord;
use crate::error::Result;

pub use listing::{Listing, Post, POST_LINK_BASE};
pub use reddit::RedditSource;

// == Feed Source Trait ==
/// Fetches the current posts of one feed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Returns the feed's posts, already stripped of age-restricted items.
    ///
    /// Any transport, status or parse failure is a `MemeError::Fetch`.
    async fn fetch(&self, feed: &str) -> Result<Vec<ContentRecord>>;
}
