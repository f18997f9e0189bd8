//! Error types for session and snapshot operations.

use thiserror::Error;

/// Errors from session persistence and compaction bookkeeping.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The context estimate exceeds the hard limit even after compaction.
    ///
    /// The only way forward is a fresh session or a cleared history.
    #[error(
        "context too large even after compaction ({estimated} tokens > {limit} limit); \
         start a new session or clear history"
    )]
    ContextTooLarge {
        /// Estimated token count after compaction.
        estimated: u32,
        /// Configured hard limit.
        limit: u32,
    },

    /// Snapshot file could not be read or written.
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A document failed to decode on an explicit decode request.
    ///
    /// Snapshot *loading* never surfaces this; an undecodable snapshot is
    /// treated as absent and a fresh session starts instead.
    #[error("snapshot document malformed: {0}")]
    Codec(#[from] moat_codec::CodecError),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
