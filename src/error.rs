//! Error types for the image cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the image cache.
///
/// Variants carry plain messages and the enum is `Clone` so that a single
/// download failure can be delivered to every request waiting on it.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Malformed or empty resource identifier; raised before any I/O
    #[error("Invalid source: {0}")]
    InvalidSource(String),

    /// Network error or non-success HTTP status during a download
    #[error("Transport error: {0}")]
    Transport(String),

    /// Filesystem adapter failure (stat, write, mkdir, delete)
    #[error("Filesystem error: {0}")]
    Filesystem(String),

    /// Internal error (registry or runtime fault)
    #[error("Internal error: {0}")]
    Internal(String),
}

// == Result Type Alias ==
/// Convenience Result type for the image cache.
pub type Result<T> = std::result::Result<T, CacheError>;
