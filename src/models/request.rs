//! Resource Request Module
//!
//! Defines the per-call request handed to the cache manager and the
//! transport options attached to it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::models::ImageSource;

// == Download Options ==
/// Transport parameters for a download.
///
/// Headers are kept in a sorted map so two requests with the same headers in
/// a different insertion order canonicalize identically. Headers participate
/// in cache key derivation; the method is transport-only and does not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOptions {
    /// Request headers, sorted by name
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// HTTP method; GET when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl DownloadOptions {
    /// Creates empty options (GET, no headers).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the HTTP method.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Resolves these options against configured defaults.
    ///
    /// Default headers apply only where the request does not set the same
    /// header name. Called once per request at the cache manager boundary.
    pub fn resolved_with(&self, default_headers: &BTreeMap<String, String>) -> Self {
        let mut headers = default_headers.clone();
        headers.extend(self.headers.clone());
        Self {
            headers,
            method: self.method.clone(),
        }
    }
}

// == Resource Request ==
/// A single `get` call: what to fetch and under which cache policy.
///
/// Immutable once constructed; one instance per call.
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    /// The resource to resolve
    pub source: ImageSource,
    /// Transport parameters for the download
    pub options: DownloadOptions,
    /// When true, skip all freshness checks and always re-download
    pub no_cache: bool,
    /// Freshness window in seconds; `None` defers to the configured default
    pub max_age: Option<u64>,
}

impl ResourceRequest {
    // == Constructor ==
    /// Creates a request with default policy (cached, no freshness window).
    pub fn new(source: impl Into<ImageSource>) -> Self {
        Self {
            source: source.into(),
            options: DownloadOptions::default(),
            no_cache: false,
            max_age: None,
        }
    }

    /// Attaches transport options.
    pub fn with_options(mut self, options: DownloadOptions) -> Self {
        self.options = options;
        self
    }

    /// Forces a fresh download regardless of any cached copy.
    pub fn with_no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    /// Sets the freshness window in seconds.
    pub fn with_max_age(mut self, seconds: u64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    // == Validation ==
    /// Validates the request data.
    ///
    /// Returns an error message if validation fails, None if valid. Runs
    /// before any filesystem or network work.
    pub fn validate(&self) -> Option<String> {
        match &self.source {
            ImageSource::Remote(uri) => {
                if uri.is_empty() {
                    return Some("Source URI cannot be empty".to_string());
                }
                match Url::parse(uri) {
                    Ok(url) if url.scheme() == "http" || url.scheme() == "https" => None,
                    Ok(url) => Some(format!("Unsupported URL scheme '{}'", url.scheme())),
                    Err(e) => Some(format!("Malformed source URI: {}", e)),
                }
            }
            ImageSource::Local(path) => {
                if path.as_os_str().is_empty() {
                    Some("Source path cannot be empty".to_string())
                } else {
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let req = ResourceRequest::new("https://example.com/a.png");
        assert!(req.source.is_remote());
        assert!(!req.no_cache);
        assert!(req.max_age.is_none());
        assert!(req.options.headers.is_empty());
    }

    #[test]
    fn test_request_builder() {
        let req = ResourceRequest::new("https://example.com/a.png")
            .with_options(DownloadOptions::new().with_header("Authorization", "Bearer t"))
            .with_no_cache(true)
            .with_max_age(60);

        assert!(req.no_cache);
        assert_eq!(req.max_age, Some(60));
        assert_eq!(
            req.options.headers.get("Authorization").map(String::as_str),
            Some("Bearer t")
        );
    }

    #[test]
    fn test_validate_empty_uri() {
        let req = ResourceRequest {
            source: ImageSource::Remote(String::new()),
            options: DownloadOptions::default(),
            no_cache: false,
            max_age: None,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_malformed_uri() {
        let req = ResourceRequest {
            source: ImageSource::Remote("http://".to_string()),
            options: DownloadOptions::default(),
            no_cache: false,
            max_age: None,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_valid_request() {
        let req = ResourceRequest::new("https://example.com/images/a.png");
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_validate_empty_local_path() {
        let req = ResourceRequest::new("");
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_options_resolution_request_wins() {
        let mut defaults = BTreeMap::new();
        defaults.insert("Accept".to_string(), "image/*".to_string());
        defaults.insert("User-Agent".to_string(), "imgcache".to_string());

        let options = DownloadOptions::new().with_header("Accept", "image/png");
        let resolved = options.resolved_with(&defaults);

        assert_eq!(
            resolved.headers.get("Accept").map(String::as_str),
            Some("image/png")
        );
        assert_eq!(
            resolved.headers.get("User-Agent").map(String::as_str),
            Some("imgcache")
        );
    }

    #[test]
    fn test_options_deserialize() {
        let json = r#"{"headers": {"Accept": "image/*"}}"#;
        let options: DownloadOptions = serde_json::from_str(json).unwrap();
        assert_eq!(
            options.headers.get("Accept").map(String::as_str),
            Some("image/*")
        );
        assert!(options.method.is_none());
    }
}
