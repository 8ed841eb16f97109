//! Content Record Module
//!
//! The post shape served to callers, and its compact binary form used for storage.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{MemeError, Result};

/// Encoded record as held by the cache. Shared so snapshots never copy bytes.
pub type EncodedRecord = Arc<[u8]>;

// == Content Record ==
/// A single post taken from a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub title: String,
    pub author: String,
    /// Feed the post was fetched from
    #[serde(rename = "subreddit")]
    pub source: String,
    /// Absolute link to the post
    #[serde(rename = "postLink")]
    pub post_link: String,
    #[serde(rename = "ups")]
    pub score: i64,
    /// Linked media, when the post has one
    #[serde(rename = "url")]
    pub media_url: Option<String>,
}

impl ContentRecord {
    // == Encode ==
    /// Serializes the record into its storage form.
    pub fn encode(&self) -> Result<EncodedRecord> {
        bincode::serialize(self)
            .map(Into::into)
            .map_err(|e| MemeError::Internal(format!("failed to encode record: {e}")))
    }

    // == Decode ==
    /// Restores a record from bytes produced by [`ContentRecord::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| MemeError::Decode(e.to_string()))
    }
}
