//! Listing Module
//!
//! Wire shape of an upstream listing response and its mapping onto records.

use serde::Deserialize;

use crate::cache::ContentRecord;

/// Prefix joined with each post's relative permalink.
pub const POST_LINK_BASE: &str = "https://reddit.com";

/// Top-level listing envelope: `{"data": {"children": [...]}}`.
#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
pub struct ListingChild {
    pub data: Post,
}

/// One upstream post.
#[derive(Debug, Deserialize)]
pub struct Post {
    pub title: String,
    pub author: String,
    pub permalink: String,
    #[serde(default)]
    pub ups: i64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub over_18: bool,
}

impl Post {
    /// Builds the record stored under `feed`.
    pub fn into_record(self, feed: &str) -> ContentRecord {
        ContentRecord {
            title: self.title,
            author: self.author,
            source: feed.to_string(),
            post_link: format!("{POST_LINK_BASE}{}", self.permalink),
            score: self.ups,
            media_url: self.url,
        }
    }
}

impl Listing {
    /// Converts the listing into records for `feed`, dropping age-restricted posts.
    pub fn into_records(self, feed: &str) -> Vec<ContentRecord> {
        self.data
            .children
            .into_iter()
            .map(|child| child.data)
            .filter(|post| !post.over_18)
            .map(|post| post.into_record(feed))
            .collect()
    }
}
