//! Workspace fingerprint: drift detection between conversation turns.
//!
//! The fingerprint is a SHA-256 digest over the sorted, filtered list of
//! relative file paths under a root — path names only, so it is cheap and
//! insensitive to content edits; what it catches is files appearing and
//! disappearing. Hidden components and ignored directories (VCS metadata,
//! dependency caches, build output) never contribute, so churn inside
//! `.git/` or `node_modules/` hashes identically.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use sha2::{Digest, Sha256};
use tracing::debug;
use walkdir::WalkDir;

use crate::session::Session;

/// A computed workspace fingerprint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilesFingerprint {
    /// Hex-encoded SHA-256 over the sorted listing.
    pub hash: String,
    /// The sorted relative paths that were hashed.
    pub paths: Vec<String>,
}

/// Compute the fingerprint of the tree under `root`.
///
/// `ignore_patterns` are glob patterns matched against individual path
/// component names (e.g. `.git`, `node_modules`); a matching directory is
/// skipped along with everything inside it. Hidden names are always
/// skipped.
pub fn files_fingerprint(
    root: &Path,
    ignore_patterns: &[String],
) -> std::io::Result<FilesFingerprint> {
    let ignore = build_ignore_set(ignore_patterns);

    let mut paths: Vec<String> = Vec::new();
    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded_name(entry.file_name(), &ignore));

    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_dir() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        paths.push(relative.to_string_lossy().into_owned());
    }

    paths.sort_unstable();

    let mut hasher = Sha256::new();
    for path in &paths {
        hasher.update(path.as_bytes());
        hasher.update(b"\n");
    }

    Ok(FilesFingerprint {
        hash: format!("{:x}", hasher.finalize()),
        paths,
    })
}

/// Refresh a session's fingerprint against the tree under `root`.
///
/// On drift, a compact delta (`+added`, `-removed` entries) is recorded on
/// the session instead of the full tree, and the stored hash and listing
/// are updated. Returns whether drift was detected. Called on every
/// resume.
pub fn refresh_files(
    session: &mut Session,
    root: &Path,
    ignore_patterns: &[String],
) -> std::io::Result<bool> {
    let fingerprint = files_fingerprint(root, ignore_patterns)?;

    let drifted = match &session.files_hash {
        None => {
            // First sight of this workspace: store the full listing, no delta.
            session.files_hash = Some(fingerprint.hash);
            session.files = fingerprint.paths;
            return Ok(false);
        }
        Some(stored) => *stored != fingerprint.hash,
    };

    if drifted {
        let delta = listing_delta(&session.files, &fingerprint.paths);
        debug!(entries = delta.len(), "workspace drift detected");
        session.set_files_delta(delta);
        session.files_hash = Some(fingerprint.hash);
        session.files = fingerprint.paths;
    }

    Ok(drifted)
}

/// Diff two sorted listings into `+added` / `-removed` entries.
#[must_use]
pub fn listing_delta(before: &[String], after: &[String]) -> Vec<String> {
    use std::collections::BTreeSet;

    let old: BTreeSet<&String> = before.iter().collect();
    let new: BTreeSet<&String> = after.iter().collect();

    let mut delta: Vec<String> = new
        .difference(&old)
        .map(|p| format!("+{p}"))
        .collect();
    delta.extend(old.difference(&new).map(|p| format!("-{p}")));
    delta
}

fn build_ignore_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        if let Ok(glob) = Glob::new(pattern) {
            let _ = builder.add(glob);
        } else {
            tracing::warn!(pattern, "invalid ignore pattern, skipping");
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}

fn is_excluded_name(name: &std::ffi::OsStr, ignore: &GlobSet) -> bool {
    let name = name.to_string_lossy();
    name.starts_with('.') || ignore.is_match(name.as_ref())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
