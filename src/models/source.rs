//! Image Source Module
//!
//! Splits resource identifiers into remote locators (cached) and local
//! paths (served verbatim).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// == Image Source ==
/// Identifies the resource a request refers to.
///
/// A source is remote iff its identifier carries an HTTP(S) scheme; anything
/// else is treated as an on-device path that needs no caching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSource {
    /// Network-addressed resource, cached on disk
    Remote(String),
    /// Bundled or on-device resource, returned as-is
    Local(PathBuf),
}

impl ImageSource {
    // == Constructor ==
    /// Classifies a raw identifier into a remote or local source.
    pub fn from_uri(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        if is_remote_uri(&uri) {
            ImageSource::Remote(uri)
        } else {
            ImageSource::Local(PathBuf::from(uri))
        }
    }

    // == Is Remote ==
    /// Returns true for network-addressed sources.
    pub fn is_remote(&self) -> bool {
        matches!(self, ImageSource::Remote(_))
    }
}

impl From<&str> for ImageSource {
    fn from(uri: &str) -> Self {
        ImageSource::from_uri(uri)
    }
}

impl From<String> for ImageSource {
    fn from(uri: String) -> Self {
        ImageSource::from_uri(uri)
    }
}

// == Utility Functions ==
/// Returns true if the identifier starts with an HTTP(S) scheme.
fn is_remote_uri(uri: &str) -> bool {
    let lower = uri.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
