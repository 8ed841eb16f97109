//! Request DTOs for the meme API
//!
//! Defines the query parameters accepted by the selection endpoints.

use serde::Deserialize;

use crate::cache::MAX_KEY_LENGTH;

/// Query string for `GET /` and `GET /:feed`
///
/// # Fields
/// - `amount`: Number of records to draw; absent or 0 returns a single record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectQuery {
    #[serde(default)]
    pub amount: Option<usize>,
}

/// Checks a feed key taken from the request path.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_feed_key(feed: &str) -> Option<String> {
    if feed.is_empty() {
        return Some("Feed name cannot be empty".to_string());
    }
    if feed.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Feed name exceeds maximum length of {} characters",
            MAX_KEY_LENGTH
        ));
    }
    if !feed.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Some("Feed name may only contain letters, digits and underscores".to_string());
    }
    None
}
