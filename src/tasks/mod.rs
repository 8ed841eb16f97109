//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Feed refresh: refetches every configured feed, starting at boot
//! - TTL cleanup: drops expired feeds at configured intervals

mod cleanup;
mod refresh;

pub use cleanup::spawn_cleanup_task;
pub use refresh::spawn_refresh_task;
