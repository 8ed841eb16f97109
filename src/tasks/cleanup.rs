//! TTL Cleanup Task
//!
//! Background task that periodically drops expired feed entries so their
//! memory is released even if nobody asks for them again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::FeedCache;

/// Spawns a background task that periodically purges expired feeds.
///
/// # Arguments
/// * `cache` - Shared reference to the feed cache
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(
    cache: Arc<RwLock<FeedCache>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.purge_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired feeds", removed);
            } else {
                debug!("TTL cleanup: no expired feeds found");
            }
        }
    })
}
