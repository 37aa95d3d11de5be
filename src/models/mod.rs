//! Request models for the cache boundary
//!
//! This module defines the types a consumer hands to the cache manager:
//! the resource source, transport options, and the per-call request.

pub mod request;
pub mod source;

// Re-export commonly used types
pub use request::{DownloadOptions, ResourceRequest};
pub use source::ImageSource;
