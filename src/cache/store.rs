//! Cache Entry Store Module
//!
//! Durable mapping of cache key to file, layered over the filesystem
//! adapter. The directory itself is the persistence format: no index, no
//! sidecar metadata.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheEntry, KEY_LENGTH};
use crate::error::Result;
use crate::fs::FileSystem;

// == Entry Store ==
/// Key → file mapping inside a single flat cache directory.
#[derive(Clone)]
pub struct EntryStore {
    fs: Arc<dyn FileSystem>,
    cache_dir: PathBuf,
}

impl EntryStore {
    // == Constructor ==
    pub fn new(fs: Arc<dyn FileSystem>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            cache_dir: cache_dir.into(),
        }
    }

    /// The directory holding all entries.
    pub fn cache_dir(&self) -> &PathBuf {
        &self.cache_dir
    }

    /// Deterministic path for an entry filename.
    pub fn entry_path(&self, file_name: &str) -> PathBuf {
        self.cache_dir.join(file_name)
    }

    // == Ensure Directory ==
    /// Creates the cache directory, tolerating an existing one.
    pub async fn ensure_dir(&self) -> Result<()> {
        self.fs.make_directory(&self.cache_dir).await
    }

    // == Lookup ==
    /// Returns the entry stored under `file_name`, or None when absent.
    pub async fn lookup(&self, file_name: &str) -> Result<Option<CacheEntry>> {
        let path = self.entry_path(file_name);
        if !self.fs.exists(&path).await? {
            return Ok(None);
        }
        let info = self.fs.stat(&path).await?;
        Ok(Some(CacheEntry::from_info(info)))
    }

    // == Remove ==
    /// Deletes a single entry; succeeds when it is already absent.
    pub async fn remove(&self, file_name: &str) -> Result<()> {
        let path = self.entry_path(file_name);
        if self.fs.exists(&path).await? {
            self.fs.delete(&path).await?;
        }
        Ok(())
    }

    // == Clear ==
    /// Deletes every entry in the cache directory.
    ///
    /// Returns the number of entries removed. An absent directory counts
    /// as already empty.
    pub async fn clear(&self) -> Result<usize> {
        if !self.fs.exists(&self.cache_dir).await? {
            return Ok(0);
        }
        let names = self.fs.list(&self.cache_dir).await?;
        let mut removed = 0;
        for name in names {
            self.fs.delete(&self.entry_path(&name)).await?;
            removed += 1;
        }
        Ok(removed)
    }

    // == Total Size ==
    /// Total bytes held by cached files.
    pub async fn total_size(&self) -> Result<u64> {
        if !self.fs.exists(&self.cache_dir).await? {
            return Ok(0);
        }
        let infos = self.fs.stat_dir(&self.cache_dir).await?;
        Ok(infos
            .iter()
            .filter(|info| !info.is_directory)
            .map(|info| info.size)
            .sum())
    }

    // == Prune ==
    /// Removes entries older than `max_entry_age_secs`.
    ///
    /// Stale `.part` staging leftovers age out through the same sweep.
    /// Returns the number of entries removed.
    pub async fn prune_older_than(&self, max_entry_age_secs: u64) -> Result<usize> {
        if !self.fs.exists(&self.cache_dir).await? {
            return Ok(0);
        }
        let infos = self.fs.stat_dir(&self.cache_dir).await?;
        let mut removed = 0;
        for info in infos {
            if info.is_directory {
                continue;
            }
            let entry = CacheEntry::from_info(info);
            if !entry.is_fresh(Some(max_entry_age_secs)) {
                debug!("Pruning stale cache entry {}", entry.path.display());
                self.fs.delete(&entry.path).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// True when `file_name` looks like a derived entry (hex key prefix).
    ///
    /// Useful for callers walking the directory with foreign files mixed in.
    pub fn is_entry_name(file_name: &str) -> bool {
        file_name.len() >= KEY_LENGTH
            && file_name
                .chars()
                .take(KEY_LENGTH)
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
    }
}
