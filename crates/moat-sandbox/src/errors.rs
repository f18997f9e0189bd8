//! Error types for the sandbox boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the sandbox boundary.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// A path resolved outside the sandbox root without escape enabled.
    ///
    /// Surfaced to the user verbatim and never auto-corrected to a "safe"
    /// alternative. The message names the attempted absolute path, the
    /// configured root, and the exact confirmation escape requires.
    #[error(
        "sandbox violation: {} is outside the sandbox root {}. \
         Operating outside the sandbox requires typing the exact literal \"YES\".",
        attempted.display(),
        root.display()
    )]
    Violation {
        /// The fully resolved path that was denied.
        attempted: PathBuf,
        /// The configured sandbox root.
        root: PathBuf,
    },

    /// A directory operation targeted something that is not a directory.
    #[error("not a directory: {}", path.display())]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The filesystem failed while canonicalizing a path.
    #[error("path resolution failed: {0}")]
    Io(#[from] std::io::Error),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
