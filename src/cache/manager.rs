//! Cache Manager Module
//!
//! Orchestrates key derivation, freshness checks, the in-flight registry,
//! and the filesystem adapter. The public entry point is
//! [`CacheManager::get`], which returns a [`CacheHandle`] resolving to a
//! usable local path or an error.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::cache::key;
use crate::cache::{CacheStats, EntryStore, InFlightRegistry};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::fs::FileSystem;
use crate::models::{DownloadOptions, ImageSource, ResourceRequest};

struct ManagerInner {
    config: CacheConfig,
    fs: Arc<dyn FileSystem>,
    store: EntryStore,
    inflight: InFlightRegistry,
    dir_init: OnceCell<()>,
    stats: Mutex<CacheStats>,
}

// == Cache Manager ==
/// Entry point for resolving resources to local paths.
///
/// Explicitly constructed and cheaply cloneable; independent instances
/// share nothing, so tests can run isolated caches side by side.
#[derive(Clone)]
pub struct CacheManager {
    inner: Arc<ManagerInner>,
}

impl CacheManager {
    // == Constructor ==
    /// Creates a manager over the given configuration and filesystem
    /// adapter.
    ///
    /// The cache directory is created lazily before the first write, not
    /// here, so constructing a manager performs no I/O.
    pub fn new(config: CacheConfig, fs: Arc<dyn FileSystem>) -> Self {
        let store = EntryStore::new(fs.clone(), config.cache_dir.clone());
        Self {
            inner: Arc::new(ManagerInner {
                config,
                fs,
                store,
                inflight: InFlightRegistry::new(),
                dir_init: OnceCell::new(),
                stats: Mutex::new(CacheStats::new()),
            }),
        }
    }

    // == Get ==
    /// Begins resolving a request.
    ///
    /// Returns immediately; all I/O happens when the handle's
    /// [`get_path`](CacheHandle::get_path) is awaited.
    pub fn get(&self, request: ResourceRequest) -> CacheHandle {
        CacheHandle {
            inner: self.inner.clone(),
            request,
        }
    }

    // == Stats ==
    /// Returns a snapshot of the current statistics.
    pub fn stats(&self) -> CacheStats {
        self.inner.stats.lock().unwrap().clone()
    }

    /// The entry store backing this manager, for maintenance tasks.
    pub fn entry_store(&self) -> EntryStore {
        self.inner.store.clone()
    }

    /// The configuration this manager was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    // == Maintenance ==
    /// Deletes every cached entry; returns the number removed.
    pub async fn clear_cache(&self) -> Result<usize> {
        let removed = self.inner.store.clear().await?;
        info!("Cleared {} cached entries", removed);
        Ok(removed)
    }

    /// Total bytes currently held in the cache directory.
    pub async fn cache_size(&self) -> Result<u64> {
        self.inner.store.total_size().await
    }

    /// Invalidates the entry for one (uri, options) pair.
    ///
    /// Succeeds when no such entry exists.
    pub async fn remove_entry(&self, uri: &str, options: &DownloadOptions) -> Result<()> {
        let resolved = options.resolved_with(&self.inner.config.default_headers);
        let cache_key = key::derive_key(uri, &resolved)?;
        let file_name = key::file_name_for(uri, &cache_key);
        self.inner.store.remove(&file_name).await
    }
}

// == Cache Handle ==
/// The pending resolution returned by [`CacheManager::get`].
///
/// Awaiting [`get_path`](Self::get_path) performs the freshness check and,
/// when needed, the (shared) download. Dropping the handle never cancels a
/// download other requests may be waiting on.
pub struct CacheHandle {
    inner: Arc<ManagerInner>,
    request: ResourceRequest,
}

impl CacheHandle {
    /// Resolves to the local path for the requested resource.
    pub async fn get_path(self) -> Result<PathBuf> {
        let inner = self.inner;
        let result = Arc::clone(&inner).resolve(self.request).await;
        if result.is_err() {
            inner.stats.lock().unwrap().record_failure();
        }
        result
    }
}

impl ManagerInner {
    async fn resolve(self: Arc<Self>, request: ResourceRequest) -> Result<PathBuf> {
        if let Some(message) = request.validate() {
            return Err(CacheError::InvalidSource(message));
        }

        // Local resources are served verbatim: no key, no I/O, no caching
        let uri = match request.source {
            ImageSource::Local(path) => {
                debug!("Serving local resource {}", path.display());
                return Ok(path);
            }
            ImageSource::Remote(uri) => uri,
        };

        // Resolve per-request policy against configured defaults, once
        let options = request.options.resolved_with(&self.config.default_headers);
        let max_age = request.max_age.or(self.config.default_max_age);

        let cache_key = key::derive_key(&uri, &options)?;
        let file_name = key::file_name_for(&uri, &cache_key);

        self.ensure_cache_dir().await?;

        if request.no_cache {
            debug!("no_cache set, bypassing freshness checks for {}", uri);
        } else {
            if let Some(entry) = self.store.lookup(&file_name).await? {
                if entry.is_fresh(max_age) {
                    debug!("Cache hit for {}", uri);
                    self.stats.lock().unwrap().record_hit();
                    return Ok(entry.path);
                }
                debug!(
                    "Cache entry for {} is stale (age {}ms), refreshing",
                    uri,
                    entry.age_ms()
                );
            }
            self.stats.lock().unwrap().record_miss();
        }

        self.download_shared(uri, options, cache_key, file_name).await
    }

    /// Creates the cache directory once per manager, tolerating an
    /// existing one.
    async fn ensure_cache_dir(&self) -> Result<()> {
        self.dir_init
            .get_or_try_init(|| async { self.store.ensure_dir().await })
            .await?;
        Ok(())
    }

    /// Downloads through the in-flight registry: one network fetch per key,
    /// shared by every concurrent request for it.
    async fn download_shared(
        self: Arc<Self>,
        uri: String,
        options: DownloadOptions,
        cache_key: String,
        file_name: String,
    ) -> Result<PathBuf> {
        let (is_owner, receiver) = self.inflight.acquire(&cache_key);

        if is_owner {
            info!("Downloading {}", uri);
            self.stats.lock().unwrap().record_download();

            // The owner's work runs detached: a waiter that stops polling
            // its handle must not abort a download others depend on
            let inner = Arc::clone(&self);
            tokio::spawn(async move {
                let destination = inner.store.entry_path(&file_name);
                let outcome = inner
                    .fs
                    .download(&uri, &destination, &options)
                    .await
                    .map(|info| info.path);
                if let Err(e) = &outcome {
                    warn!("Download of {} failed: {}", uri, e);
                }
                inner.inflight.settle(&cache_key, outcome);
            });
        } else {
            debug!("Joining in-flight download for {}", uri);
            self.stats.lock().unwrap().record_coalesced();
        }

        InFlightRegistry::wait(receiver).await
    }
}
