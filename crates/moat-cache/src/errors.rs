//! Error types for the response cache.
//!
//! Callers on the request path treat any of these as a cache miss; they
//! are surfaced as values only so the store's own maintenance operations
//! can report what went wrong.

use thiserror::Error;

/// A cache entry could not be written or read.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem failure under the cache directory.
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Entry envelope could not be serialized or parsed.
    #[error("cache entry malformed: {0}")]
    Serde(#[from] serde_json::Error),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
