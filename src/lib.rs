//! imgcache - On-disk cache for remotely fetched images
//!
//! Resolves remote resources to local file paths, deduplicating concurrent
//! downloads per resource and honoring caller-specified freshness windows.

pub mod cache;
pub mod config;
pub mod error;
pub mod fs;
pub mod models;
pub mod tasks;

pub use cache::{CacheHandle, CacheManager, CacheStats};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use fs::{DiskFileSystem, FileInfo, FileSystem, MemoryFileSystem};
pub use models::{DownloadOptions, ImageSource, ResourceRequest};
pub use tasks::spawn_prune_task;
