//! Meme API - random posts from a periodically refreshed feed cache
//!
//! Feeds are fetched on a schedule into a TTL cache of bounded per-feed queues,
//! and served back as uniformly random picks over HTTP.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod service;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use service::{MemeService, Selection};
pub use tasks::{spawn_cleanup_task, spawn_refresh_task};
