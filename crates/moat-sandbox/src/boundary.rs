//! The sandbox boundary: root, current directory, and the escape flag.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::ESCAPE_CONFIRMATION;
use crate::errors::SandboxError;
use crate::resolve::canonicalize_lenient;

/// Authorization boundary for all filesystem access.
///
/// Holds the canonicalized sandbox root (fixed for the process lifetime),
/// the current working directory used to resolve relative candidates, and
/// the one-way escape flag. Constructed once at startup and shared by
/// reference; the guard itself performs no I/O beyond path metadata lookups
/// during canonicalization.
#[derive(Debug)]
pub struct SandboxBoundary {
    root: PathBuf,
    cwd: RwLock<PathBuf>,
    escape_enabled: AtomicBool,
}

impl SandboxBoundary {
    /// Initialize the boundary from the launch directory.
    ///
    /// The root is canonicalized (symlinks resolved) and must exist and be
    /// a directory. The current directory starts at the root.
    pub fn initialize(root: impl AsRef<Path>) -> Result<Self, SandboxError> {
        let canonical = std::fs::canonicalize(root.as_ref())?;
        if !canonical.is_dir() {
            return Err(SandboxError::NotADirectory { path: canonical });
        }
        info!(root = %canonical.display(), "sandbox initialized");
        Ok(Self {
            cwd: RwLock::new(canonical.clone()),
            root: canonical,
            escape_enabled: AtomicBool::new(false),
        })
    }

    /// The canonicalized sandbox root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The current working directory (always inside the root unless escape
    /// was enabled and `chdir` moved outside).
    #[must_use]
    pub fn current_dir(&self) -> PathBuf {
        self.cwd.read().clone()
    }

    /// Whether filesystem escape has been confirmed.
    #[must_use]
    pub fn escape_enabled(&self) -> bool {
        self.escape_enabled.load(Ordering::Relaxed)
    }

    /// Enable filesystem escape, if `token` is the exact confirmation.
    ///
    /// Only the literal `"YES"` enables escape; any other value — case
    /// variants, surrounding whitespace, anything — is a silent no-op that
    /// leaves the sandbox enforced. Enabling is one-way for the process
    /// lifetime and does not relocate the current directory.
    ///
    /// Returns whether escape is enabled after the call.
    pub fn toggle_escape(&self, token: &str) -> bool {
        if token == ESCAPE_CONFIRMATION {
            self.escape_enabled.store(true, Ordering::Relaxed);
            warn!(root = %self.root.display(), "sandbox escape enabled; all filesystem operations allowed");
        } else {
            debug!("escape confirmation mismatch; sandbox remains enforced");
        }
        self.escape_enabled()
    }

    /// Resolve `candidate` and authorize it against the boundary.
    ///
    /// Relative candidates are joined onto the current directory. The
    /// result is fully canonicalized — `..` segments and symlinks resolved,
    /// missing tails tolerated for write targets — *before* the
    /// component-wise prefix comparison against the root.
    ///
    /// # Errors
    ///
    /// [`SandboxError::Violation`] when the resolved path leaves the root
    /// and escape is not enabled. The check happens before any I/O the
    /// caller might do, so a denied path is never partially acted upon.
    pub fn resolve_and_check(&self, candidate: impl AsRef<Path>) -> Result<PathBuf, SandboxError> {
        let candidate = candidate.as_ref();
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.cwd.read().join(candidate)
        };

        let resolved = canonicalize_lenient(&joined)?;

        if resolved.starts_with(&self.root) || self.escape_enabled() {
            Ok(resolved)
        } else {
            debug!(
                attempted = %resolved.display(),
                root = %self.root.display(),
                "path denied by sandbox"
            );
            Err(SandboxError::Violation {
                attempted: resolved,
                root: self.root.clone(),
            })
        }
    }

    /// Change the current directory.
    ///
    /// An empty or absent candidate resolves to the sandbox root — never to
    /// an OS-level home directory. The target goes through the same
    /// authorization as any other path and must be an existing directory.
    ///
    /// Returns the new current directory.
    pub fn chdir(&self, candidate: Option<&Path>) -> Result<PathBuf, SandboxError> {
        let target = match candidate {
            None => self.root.clone(),
            Some(p) if p.as_os_str().is_empty() => self.root.clone(),
            Some(p) => self.resolve_and_check(p)?,
        };

        if !target.is_dir() {
            return Err(SandboxError::NotADirectory { path: target });
        }

        debug!(cwd = %target.display(), "working directory changed");
        *self.cwd.write() = target.clone();
        Ok(target)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
