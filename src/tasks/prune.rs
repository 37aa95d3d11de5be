//! Cache Prune Task
//!
//! Background task that periodically removes cache entries older than a
//! configured age.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::EntryStore;

/// Spawns a background task that periodically prunes old cache entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. Each sweep deletes entries whose age exceeds
/// `max_entry_age_secs`; freshness windows on individual requests are
/// unaffected, this only reclaims disk space.
///
/// # Arguments
/// * `store` - The entry store to sweep
/// * `interval_secs` - Interval in seconds between sweeps
/// * `max_entry_age_secs` - Entries older than this are deleted
///
/// # Returns
/// A JoinHandle for the spawned task, which the host aborts during
/// graceful shutdown.
pub fn spawn_prune_task(
    store: EntryStore,
    interval_secs: u64,
    max_entry_age_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting cache prune task with interval of {} seconds",
            interval_secs
        );

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            match store.prune_older_than(max_entry_age_secs).await {
                Ok(removed) if removed > 0 => {
                    info!("Cache prune: removed {} old entries", removed);
                }
                Ok(_) => {
                    debug!("Cache prune: no old entries found");
                }
                Err(e) => {
                    warn!("Cache prune sweep failed: {}", e);
                }
            }
        }
    })
}
