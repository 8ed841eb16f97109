//! Error types for the meme service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Meme Error Enum ==
/// Unified error type for the meme service.
#[derive(Error, Debug)]
pub enum MemeError {
    /// Stored record bytes could not be decoded
    #[error("Corrupt record: {0}")]
    Decode(String),

    /// Upstream fetch failed for one feed
    #[error("Failed to fetch feed '{feed}': {reason}")]
    Fetch { feed: String, reason: String },

    /// Nothing to select from
    #[error("No content available")]
    EmptyPool,

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MemeError {
    /// Shorthand for a fetch failure on `feed`.
    pub fn fetch(feed: impl Into<String>, reason: impl ToString) -> Self {
        MemeError::Fetch {
            feed: feed.into(),
            reason: reason.to_string(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for MemeError {
    fn into_response(self) -> Response {
        let status = match &self {
            MemeError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MemeError::Fetch { .. } => StatusCode::BAD_GATEWAY,
            MemeError::EmptyPool => StatusCode::SERVICE_UNAVAILABLE,
            MemeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            MemeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the meme service.
pub type Result<T> = std::result::Result<T, MemeError>;
