//! In-Flight Registry Module
//!
//! Process-wide map of cache key to pending download, collapsing
//! concurrent requests for the same key into one network fetch. The
//! load-bearing invariant: an entry is removed when its download settles,
//! success or failure, so no later request waits on a dead entry.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use tokio::sync::broadcast;

use crate::error::{CacheError, Result};

/// Shared result of one download, delivered to the owner and every waiter.
pub type DownloadOutcome = std::result::Result<PathBuf, CacheError>;

// == In-Flight Registry ==
/// Key → pending download map.
///
/// The interior mutex makes check-or-create atomic with respect to other
/// `acquire` calls; it is only held for map bookkeeping, never across I/O.
#[derive(Debug, Default)]
pub struct InFlightRegistry {
    entries: Mutex<HashMap<String, broadcast::Sender<DownloadOutcome>>>,
}

impl InFlightRegistry {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Acquire ==
    /// Joins the in-flight download for `key`, creating it if absent.
    ///
    /// Returns `(true, receiver)` when the caller became the owner and must
    /// perform the download and then [`settle`](Self::settle); `(false,
    /// receiver)` when an earlier request already owns it. Every receiver
    /// yields the same eventual outcome.
    pub fn acquire(&self, key: &str) -> (bool, broadcast::Receiver<DownloadOutcome>) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(sender) = entries.get(key) {
            return (false, sender.subscribe());
        }
        let (sender, receiver) = broadcast::channel(1);
        entries.insert(key.to_string(), sender);
        (true, receiver)
    }

    // == Settle ==
    /// Publishes the outcome for `key` and removes its entry.
    ///
    /// Removal happens unconditionally, for failures as much as successes.
    /// Both steps run under one lock acquisition so an `acquire` racing with
    /// settlement either receives this outcome or starts a fresh entry.
    pub fn settle(&self, key: &str, outcome: DownloadOutcome) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(sender) = entries.remove(key) {
            // No receivers means nobody is waiting anymore; nothing to do
            let _ = sender.send(outcome);
        }
    }

    // == Wait ==
    /// Awaits the shared outcome on a receiver returned by `acquire`.
    pub async fn wait(mut receiver: broadcast::Receiver<DownloadOutcome>) -> Result<PathBuf> {
        match receiver.recv().await {
            Ok(outcome) => outcome,
            Err(_) => Err(CacheError::Internal(
                "In-flight download ended without publishing a result".to_string(),
            )),
        }
    }

    // == Length ==
    /// Number of downloads currently in flight.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Returns true if no download is in flight.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}
