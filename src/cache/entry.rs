//! Cache Entry Module
//!
//! On-disk view of a cached resource. The filesystem is the store: an
//! entry's only metadata is its modification time and size, so freshness
//! is derived entirely from the file's mtime.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::fs::FileInfo;

// == Cache Entry ==
/// A cached file and the metadata freshness decisions are made from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Location of the cached file
    pub path: PathBuf,
    /// Modification time (Unix milliseconds)
    pub modification_time_ms: u64,
    /// File size in bytes
    pub size: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Builds an entry from adapter-reported metadata.
    pub fn from_info(info: FileInfo) -> Self {
        Self {
            path: info.path,
            modification_time_ms: info.modification_time_ms,
            size: info.size,
        }
    }

    // == Age ==
    /// Milliseconds elapsed since the file was last written.
    pub fn age_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.modification_time_ms)
    }

    // == Is Fresh ==
    /// Checks the entry against a freshness window.
    ///
    /// Boundary condition: an entry is fresh while its age is less than or
    /// equal to the window, so `max_age = 0` only accepts a file written in
    /// the same instant — in practice it always forces a refetch. Without a
    /// window the entry never expires by age.
    ///
    /// # Arguments
    /// * `max_age_secs` - Freshness window in seconds, `None` = no expiry
    pub fn is_fresh(&self, max_age_secs: Option<u64>) -> bool {
        match max_age_secs {
            Some(max_age) => self.age_ms() <= max_age.saturating_mul(1000),
            None => true,
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
