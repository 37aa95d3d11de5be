//! In-Memory Filesystem Adapter
//!
//! Deterministic test double for the [`FileSystem`] trait: scripted
//! download responses, per-URL download counters, an optional artificial
//! download delay, and modification-time backdating. Lets freshness and
//! dedup logic be exercised without disk or network I/O.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::cache::current_timestamp_ms;
use crate::error::{CacheError, Result};
use crate::fs::{FileInfo, FileSystem};
use crate::models::DownloadOptions;

#[derive(Debug, Clone)]
struct StoredFile {
    data: Vec<u8>,
    modification_time_ms: u64,
}

#[derive(Debug, Default)]
struct State {
    files: HashMap<PathBuf, StoredFile>,
    dirs: HashSet<PathBuf>,
    /// url -> body on success, message on failure
    responses: HashMap<String, std::result::Result<Vec<u8>, String>>,
    download_counts: HashMap<String, usize>,
}

// == Memory File System ==
/// In-memory [`FileSystem`] for tests.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    state: Mutex<State>,
    download_delay: Mutex<Option<Duration>>,
}

impl MemoryFileSystem {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Scripting ==
    /// Registers the body a download of `url` returns.
    pub fn stage_response(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert(url.into(), Ok(body.into()));
    }

    /// Registers a transport failure for downloads of `url`.
    pub fn stage_error(&self, url: impl Into<String>, message: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert(url.into(), Err(message.into()));
    }

    /// Delays every download by `delay`, widening the in-flight window so
    /// concurrent requests can pile onto one download.
    pub fn set_download_delay(&self, delay: Duration) {
        *self.download_delay.lock().unwrap() = Some(delay);
    }

    // == Inspection ==
    /// Number of downloads performed for `url`.
    pub fn download_count(&self, url: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .download_counts
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    /// Total downloads performed across all URLs.
    pub fn total_downloads(&self) -> usize {
        self.state.lock().unwrap().download_counts.values().sum()
    }

    /// Raw contents of a stored file, if present.
    pub fn file_contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(path)
            .map(|f| f.data.clone())
    }

    // == Fixture Helpers ==
    /// Inserts a file with the current modification time.
    pub fn insert_file(&self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        self.state.lock().unwrap().files.insert(
            path.into(),
            StoredFile {
                data: data.into(),
                modification_time_ms: current_timestamp_ms(),
            },
        );
    }

    /// Backdates a stored file so it appears `age_ms` old.
    ///
    /// Panics if the file does not exist; fixtures stage files first.
    pub fn set_file_age_ms(&self, path: &Path, age_ms: u64) {
        let mut state = self.state.lock().unwrap();
        let file = state
            .files
            .get_mut(path)
            .unwrap_or_else(|| panic!("no such file: {}", path.display()));
        file.modification_time_ms = current_timestamp_ms().saturating_sub(age_ms);
    }
}

fn missing(path: &Path) -> CacheError {
    CacheError::Filesystem(format!("{}: no such file or directory", path.display()))
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.files.contains_key(path) || state.dirs.contains(path))
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let state = self.state.lock().unwrap();
        if let Some(file) = state.files.get(path) {
            return Ok(FileInfo {
                path: path.to_path_buf(),
                size: file.data.len() as u64,
                modification_time_ms: file.modification_time_ms,
                is_directory: false,
            });
        }
        if state.dirs.contains(path) {
            return Ok(FileInfo {
                path: path.to_path_buf(),
                size: 0,
                modification_time_ms: 0,
                is_directory: true,
            });
        }
        Err(missing(path))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(path)
            .map(|f| f.data.clone())
            .ok_or_else(|| missing(path))
    }

    async fn list(&self, path: &Path) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        if !state.dirs.contains(path) {
            return Err(missing(path));
        }
        let names = state
            .files
            .keys()
            .filter(|p| p.parent() == Some(path))
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        Ok(names)
    }

    async fn stat_dir(&self, path: &Path) -> Result<Vec<FileInfo>> {
        let state = self.state.lock().unwrap();
        if !state.dirs.contains(path) {
            return Err(missing(path));
        }
        let infos = state
            .files
            .iter()
            .filter(|(p, _)| p.parent() == Some(path))
            .map(|(p, f)| FileInfo {
                path: p.clone(),
                size: f.data.len() as u64,
                modification_time_ms: f.modification_time_ms,
                is_directory: false,
            })
            .collect();
        Ok(infos)
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.files.remove(path).is_some() {
            return Ok(());
        }
        if state.dirs.remove(path) {
            state.files.retain(|p, _| !p.starts_with(path));
            return Ok(());
        }
        Err(missing(path))
    }

    async fn make_directory(&self, path: &Path) -> Result<()> {
        self.state.lock().unwrap().dirs.insert(path.to_path_buf());
        Ok(())
    }

    async fn download(
        &self,
        url: &str,
        destination: &Path,
        _options: &DownloadOptions,
    ) -> Result<FileInfo> {
        let delay = {
            *self.download_delay.lock().unwrap()
        };

        // Count the attempt before the simulated transfer so concurrent
        // callers observing the counter see in-progress downloads
        let response = {
            let mut state = self.state.lock().unwrap();
            *state.download_counts.entry(url.to_string()).or_insert(0) += 1;
            state.responses.get(url).cloned()
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match response {
            Some(Ok(body)) => {
                let info = FileInfo {
                    path: destination.to_path_buf(),
                    size: body.len() as u64,
                    modification_time_ms: current_timestamp_ms(),
                    is_directory: false,
                };
                self.state.lock().unwrap().files.insert(
                    destination.to_path_buf(),
                    StoredFile {
                        data: body,
                        modification_time_ms: info.modification_time_ms,
                    },
                );
                Ok(info)
            }
            // A failed download writes nothing: any previous file survives
            Some(Err(message)) => Err(CacheError::Transport(format!("{url}: {message}"))),
            None => Err(CacheError::Transport(format!("{url}: no staged response"))),
        }
    }
}
