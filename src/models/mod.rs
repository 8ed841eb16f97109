//! Request and Response models for the meme API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! query strings and HTTP response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{validate_feed_key, SelectQuery};
pub use responses::{HealthResponse, StatsResponse};
