//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults. The config is constructed once and injected into
/// [`crate::CacheManager::new`]; request handling only reads it.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Directory holding one file per cache key
    pub cache_dir: PathBuf,
    /// Default freshness window in seconds applied when a request does not
    /// carry its own; `None` means cached files never expire by age
    pub default_max_age: Option<u64>,
    /// Headers sent with every download unless overridden per request
    pub default_headers: BTreeMap<String, String>,
    /// Background prune task interval in seconds
    pub prune_interval: u64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `IMGCACHE_DIR` - Cache directory (default: `<tmp>/imgcache`)
    /// - `IMGCACHE_DEFAULT_MAX_AGE` - Default freshness window in seconds
    ///   (default: unset, cached files never expire)
    /// - `IMGCACHE_PRUNE_INTERVAL` - Prune frequency in seconds (default: 3600)
    pub fn from_env() -> Self {
        Self {
            cache_dir: env::var("IMGCACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_cache_dir()),
            default_max_age: env::var("IMGCACHE_DEFAULT_MAX_AGE")
                .ok()
                .and_then(|v| v.parse().ok()),
            default_headers: BTreeMap::new(),
            prune_interval: env::var("IMGCACHE_PRUNE_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
        }
    }

    /// Replaces the cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Sets the default freshness window in seconds.
    pub fn with_default_max_age(mut self, seconds: u64) -> Self {
        self.default_max_age = Some(seconds);
        self
    }

    /// Adds a header sent with every download unless a request overrides it.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            default_max_age: None,
            default_headers: BTreeMap::new(),
            prune_interval: 3600,
        }
    }
}

fn default_cache_dir() -> PathBuf {
    env::temp_dir().join("imgcache")
}
