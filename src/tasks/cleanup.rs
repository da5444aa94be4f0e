//! L1 Purge Task
//!
//! Background task that periodically drops expired L1 entries. Lookups
//! already ignore expired entries, so this only reclaims memory.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::LocalCaches;

/// Spawns a background task that periodically purges expired L1 entries.
///
/// # Arguments
/// * `local` - the L1 caches shared with the request handlers
/// * `cleanup_interval_secs` - Interval in seconds between purge runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let local = LocalCaches::from_config(&config);
/// let cleanup_handle = spawn_cleanup_task(local.clone(), 1);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(local: LocalCaches, cleanup_interval_secs: u64) -> JoinHandle<()> {
    spawn_cleanup_task_every(local, Duration::from_secs(cleanup_interval_secs.max(1)))
}

fn spawn_cleanup_task_every(local: LocalCaches, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting L1 purge task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = local.purge_expired();
            if removed > 0 {
                info!("L1 purge: removed {} expired entries", removed);
            } else {
                debug!("L1 purge: no expired entries found");
            }
        }
    })
}
