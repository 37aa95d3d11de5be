//! Cache Key Derivation Module
//!
//! Pure mapping from (source URI, transport options) to a stable,
//! filesystem-safe key. The key doubles as the in-memory dedup token and
//! the on-disk filename.

use std::collections::BTreeMap;

use serde::Serialize;
use sha2::{Digest, Sha256};
use url::Url;

use crate::error::{CacheError, Result};
use crate::models::DownloadOptions;

/// Length of a derived key: hex-encoded SHA-256.
pub const KEY_LENGTH: usize = 64;

/// Longest filename extension carried over from the source URI.
const MAX_EXTENSION_LENGTH: usize = 5;

/// Canonical material fed to the hash. Headers live in a sorted map, so
/// serialization order is stable regardless of how the caller built the
/// options. The HTTP method is transport-only and excluded.
#[derive(Serialize)]
struct KeyMaterial<'a> {
    uri: &'a str,
    headers: &'a BTreeMap<String, String>,
}

// == Derive Key ==
/// Derives the cache key for a remote resource.
///
/// Deterministic and side-effect-free: identical (uri, headers) pairs yield
/// the same key across calls and process restarts. Fails fast on an empty
/// URI or a non-HTTP(S) scheme, before any filesystem or network work.
pub fn derive_key(uri: &str, options: &DownloadOptions) -> Result<String> {
    validate_uri(uri)?;

    let material = KeyMaterial {
        uri,
        headers: &options.headers,
    };
    let canonical = serde_json::to_vec(&material)
        .map_err(|e| CacheError::Internal(format!("Key canonicalization failed: {e}")))?;

    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(hex::encode(hasher.finalize()))
}

// == File Name ==
/// On-disk filename for a derived key: the key itself, plus the source
/// URI's extension when one is recoverable.
pub fn file_name_for(uri: &str, key: &str) -> String {
    match extension_of(uri) {
        Some(ext) => format!("{key}.{ext}"),
        None => key.to_string(),
    }
}

fn validate_uri(uri: &str) -> Result<()> {
    if uri.is_empty() {
        return Err(CacheError::InvalidSource(
            "Source URI cannot be empty".to_string(),
        ));
    }
    match Url::parse(uri) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
        Ok(url) => Err(CacheError::InvalidSource(format!(
            "Unsupported URL scheme '{}'",
            url.scheme()
        ))),
        Err(e) => Err(CacheError::InvalidSource(format!(
            "Malformed source URI: {e}"
        ))),
    }
}

/// Extracts a short alphanumeric extension from the URI's path segment.
fn extension_of(uri: &str) -> Option<String> {
    let url = Url::parse(uri).ok()?;
    let last_segment = url.path_segments()?.last()?.to_string();
    let (_, ext) = last_segment.rsplit_once('.')?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LENGTH
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
