//! Filesystem Adapter Module
//!
//! The I/O boundary the cache manager calls through. Carries no cache
//! logic: existence checks, stat, listing, deletion, directory creation,
//! and download-to-path. The cache manager depends on the [`FileSystem`]
//! trait, never on a concrete implementation, so tests can substitute the
//! in-memory fake.

mod disk;
mod memory;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::DownloadOptions;

pub use disk::DiskFileSystem;
pub use memory::MemoryFileSystem;

// == File Info ==
/// Metadata for a single path, as reported by the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// The path the metadata describes
    pub path: std::path::PathBuf,
    /// File size in bytes (0 for directories)
    pub size: u64,
    /// Modification time, Unix epoch milliseconds
    pub modification_time_ms: u64,
    /// Whether the path is a directory
    pub is_directory: bool,
}

// == File System Trait ==
/// Capability set the cache manager consumes.
///
/// All operations are asynchronous and carry no ordering guarantee across
/// independent paths. Errors are adapter-specific and surfaced as
/// [`crate::CacheError::Filesystem`] or [`crate::CacheError::Transport`].
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Returns true if the path exists.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Returns metadata for the path; fails if it does not exist.
    async fn stat(&self, path: &Path) -> Result<FileInfo>;

    /// Reads the full contents of a file.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Lists entry names directly under a directory.
    async fn list(&self, path: &Path) -> Result<Vec<String>>;

    /// Stats every entry directly under a directory.
    async fn stat_dir(&self, path: &Path) -> Result<Vec<FileInfo>>;

    /// Deletes a file, or a directory and its contents.
    async fn delete(&self, path: &Path) -> Result<()>;

    /// Creates a directory and any missing parents; succeeds if it already
    /// exists.
    async fn make_directory(&self, path: &Path) -> Result<()>;

    /// Fetches `url` and persists the body at `destination`.
    ///
    /// Implementations must never leave a partial file at `destination`:
    /// either the full body lands there, or the previous contents (if any)
    /// survive untouched and the call fails.
    async fn download(
        &self,
        url: &str,
        destination: &Path,
        options: &DownloadOptions,
    ) -> Result<FileInfo>;
}
