//! Feed Refresh Task
//!
//! Background task that refetches every configured feed on a fixed interval.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::service::MemeService;

/// Spawns the periodic refresh loop.
///
/// The first pass runs immediately, then once every `refresh_interval_secs`.
/// Individual feed failures are handled inside the pass; the loop itself
/// never stops on its own.
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
pub fn spawn_refresh_task(service: MemeService, refresh_interval_secs: u64) -> JoinHandle<()> {
    let period = Duration::from_secs(refresh_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting feed refresh task with interval of {} seconds",
            refresh_interval_secs
        );

        let mut ticker = tokio::time::interval(period);
        // A slow pass should not be followed by a burst of catch-up passes.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let report = service.refresh_all().await;
            info!(
                "Feed refresh: {} refreshed, {} failed, {} records added",
                report.refreshed.len(),
                report.failed.len(),
                report.records_added
            );
        }
    })
}
