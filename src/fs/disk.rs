//! Disk Filesystem Adapter
//!
//! Real implementation over tokio::fs and reqwest. Downloads write to a
//! `.part` sibling and rename into place so a concurrent stat never
//! observes a partially written file.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{CacheError, Result};
use crate::fs::{FileInfo, FileSystem};
use crate::models::DownloadOptions;

// == Disk File System ==
/// Filesystem adapter backed by the local disk and an HTTP client.
#[derive(Debug, Clone)]
pub struct DiskFileSystem {
    client: reqwest::Client,
}

impl DiskFileSystem {
    // == Constructor ==
    /// Creates an adapter with a default HTTP client.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Creates an adapter around an existing HTTP client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn file_info(path: &Path, meta: &std::fs::Metadata) -> FileInfo {
        let modification_time_ms = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        FileInfo {
            path: path.to_path_buf(),
            size: meta.len(),
            modification_time_ms,
            is_directory: meta.is_dir(),
        }
    }

    fn build_headers(options: &DownloadOptions) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| CacheError::Transport(format!("Invalid header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| CacheError::Transport(format!("Invalid header value: {e}")))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    fn method_for(options: &DownloadOptions) -> Result<Method> {
        match &options.method {
            Some(m) => Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                .map_err(|_| CacheError::Transport(format!("Invalid HTTP method '{m}'"))),
            None => Ok(Method::GET),
        }
    }
}

impl Default for DiskFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Sibling path the download body is staged at before the final rename.
fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

fn fs_err(path: &Path, err: std::io::Error) -> CacheError {
    CacheError::Filesystem(format!("{}: {}", path.display(), err))
}

#[async_trait]
impl FileSystem for DiskFileSystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        fs::try_exists(path).await.map_err(|e| fs_err(path, e))
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let meta = fs::metadata(path).await.map_err(|e| fs_err(path, e))?;
        Ok(Self::file_info(path, &meta))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).await.map_err(|e| fs_err(path, e))
    }

    async fn list(&self, path: &Path) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(path).await.map_err(|e| fs_err(path, e))?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| fs_err(path, e))? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    async fn stat_dir(&self, path: &Path) -> Result<Vec<FileInfo>> {
        let mut entries = fs::read_dir(path).await.map_err(|e| fs_err(path, e))?;
        let mut infos = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| fs_err(path, e))? {
            let entry_path = entry.path();
            let meta = entry.metadata().await.map_err(|e| fs_err(&entry_path, e))?;
            infos.push(Self::file_info(&entry_path, &meta));
        }
        Ok(infos)
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        let meta = fs::metadata(path).await.map_err(|e| fs_err(path, e))?;
        if meta.is_dir() {
            fs::remove_dir_all(path).await.map_err(|e| fs_err(path, e))
        } else {
            fs::remove_file(path).await.map_err(|e| fs_err(path, e))
        }
    }

    async fn make_directory(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).await.map_err(|e| fs_err(path, e))
    }

    async fn download(
        &self,
        url: &str,
        destination: &Path,
        options: &DownloadOptions,
    ) -> Result<FileInfo> {
        let method = Self::method_for(options)?;
        let headers = Self::build_headers(options)?;

        debug!("Downloading {} to {}", url, destination.display());

        let response = self
            .client
            .request(method, url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| CacheError::Transport(format!("{url}: {e}")))?;

        let response = response
            .error_for_status()
            .map_err(|e| CacheError::Transport(format!("{url}: {e}")))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| CacheError::Transport(format!("{url}: {e}")))?;

        // Stage next to the destination so the rename stays on one filesystem
        let staging = partial_path(destination);
        if let Err(e) = fs::write(&staging, &body).await {
            let _ = fs::remove_file(&staging).await;
            return Err(fs_err(&staging, e));
        }

        if let Err(e) = fs::rename(&staging, destination).await {
            warn!(
                "Failed to move {} into place: {}",
                destination.display(),
                e
            );
            let _ = fs::remove_file(&staging).await;
            return Err(fs_err(destination, e));
        }

        self.stat(destination).await
    }
}
