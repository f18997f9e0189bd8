//! Snapshot persistence: timestamped flat-document files with a `current`
//! pointer.
//!
//! Snapshots are never deleted by a save; each save writes a new
//! timestamp-named file and repoints `current` at it, so older snapshots
//! remain on disk as history. Loading goes through the pointer; anything
//! wrong with it — missing pointer, missing file, undecodable document —
//! yields a fresh session rather than an error, because a broken snapshot
//! must never wedge the assistant.

use std::path::{Path, PathBuf};

use moat_codec::{DOCUMENT_EXTENSION, decode, encode};
use moat_settings::CompactionMode;
use tracing::{debug, warn};

use crate::compaction::ContextCompactor;
use crate::constants::{CURRENT_POINTER, SNAPSHOT_TIMESTAMP_FORMAT};
use crate::errors::SessionError;
use crate::session::Session;

/// Stores session snapshots under one directory.
#[derive(Clone, Debug)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Create a store rooted at `dir` (created lazily on first save).
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The snapshot directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Compact per the session's mode, then persist a new snapshot and
    /// repoint `current` at it.
    ///
    /// # Errors
    ///
    /// [`SessionError::ContextTooLarge`] when the estimate still exceeds
    /// the hard limit after compaction (never raised in `never` mode);
    /// [`SessionError::Io`] when the snapshot cannot be written.
    pub fn save(
        &self,
        session: &mut Session,
        compactor: &ContextCompactor,
    ) -> Result<PathBuf, SessionError> {
        let outcome = compactor.compact(session);
        let limit = compactor.settings().hard_limit_tokens;
        if session.mode != CompactionMode::Never && session.estimated_tokens() > limit {
            return Err(SessionError::ContextTooLarge {
                estimated: session.estimated_tokens(),
                limit,
            });
        }

        std::fs::create_dir_all(&self.dir)?;

        let file_name = format!(
            "{}.{DOCUMENT_EXTENSION}",
            chrono::Local::now().format(SNAPSHOT_TIMESTAMP_FORMAT)
        );
        let path = self.dir.join(&file_name);
        std::fs::write(&path, encode(&session.to_document()))?;
        std::fs::write(self.dir.join(CURRENT_POINTER), &file_name)?;

        debug!(
            snapshot = %path.display(),
            compacted = outcome.compacted,
            tokens = session.estimated_tokens(),
            "session snapshot saved"
        );
        Ok(path)
    }

    /// Load the session the `current` pointer resolves to.
    ///
    /// A missing pointer, missing snapshot, or undecodable document starts
    /// a fresh session in `default_mode` — snapshot corruption is never an
    /// error.
    #[must_use]
    pub fn load_current(&self, default_mode: CompactionMode) -> Session {
        match self.try_load_current(default_mode) {
            Ok(session) => session,
            Err(reason) => {
                warn!(%reason, "snapshot unavailable, starting fresh session");
                Session::fresh(default_mode)
            }
        }
    }

    fn try_load_current(&self, default_mode: CompactionMode) -> Result<Session, String> {
        let pointer = self.dir.join(CURRENT_POINTER);
        let file_name = std::fs::read_to_string(&pointer)
            .map_err(|e| format!("pointer unreadable: {e}"))?;
        let path = self.dir.join(file_name.trim());

        let text =
            std::fs::read_to_string(&path).map_err(|e| format!("snapshot unreadable: {e}"))?;
        let doc = decode(&text).map_err(|e| format!("snapshot undecodable: {e}"))?;

        Ok(Session::from_document(&doc, default_mode))
    }

    /// All snapshot files, newest first.
    ///
    /// Timestamp file names sort lexicographically, so name order is age
    /// order.
    #[must_use]
    pub fn list(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        let mut snapshots: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .is_some_and(|ext| ext == DOCUMENT_EXTENSION)
            })
            .collect();

        snapshots.sort_unstable();
        snapshots.reverse();
        snapshots
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;
    use assert_matches::assert_matches;
    use moat_settings::CompactionSettings;

    fn compactor() -> ContextCompactor {
        ContextCompactor::new(CompactionSettings::default())
    }

    fn store() -> (tempfile::TempDir, SnapshotStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("sessions"));
        (dir, store)
    }

    // -- save / load round trip --

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, store) = store();
        let c = compactor();
        let mut session = Session::fresh(CompactionMode::Smart);
        let _ = c.record_turn(&mut session, Role::User, "what files are here?");
        let _ = c.record_turn(&mut session, Role::Assistant, "two: a.rs and b.rs");

        let path = store.save(&mut session, &c).unwrap();
        assert!(path.exists());

        let loaded = store.load_current(CompactionMode::Smart);
        assert_eq!(loaded.id, session.id);
        assert_eq!(loaded.turns().len(), 2);
        assert_eq!(loaded.turns()[0].content, "what files are here?");
    }

    #[test]
    fn save_uses_document_extension() {
        let (_dir, store) = store();
        let c = compactor();
        let mut session = Session::fresh(CompactionMode::Smart);
        let _ = c.record_turn(&mut session, Role::User, "hi");

        let path = store.save(&mut session, &c).unwrap();
        assert_eq!(path.extension().unwrap(), DOCUMENT_EXTENSION);
    }

    #[test]
    fn later_save_supersedes_without_deleting() {
        let (_dir, store) = store();
        let c = compactor();
        let mut session = Session::fresh(CompactionMode::Smart);
        let _ = c.record_turn(&mut session, Role::User, "first");
        let first = store.save(&mut session, &c).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(5));
        let _ = c.record_turn(&mut session, Role::Assistant, "second");
        let second = store.save(&mut session, &c).unwrap();

        assert!(first.exists(), "older snapshots are kept");
        assert!(second.exists());
        // current resolves to the latest
        let loaded = store.load_current(CompactionMode::Smart);
        assert_eq!(loaded.turns().len(), 2);
    }

    // -- failure recovery --

    #[test]
    fn missing_pointer_starts_fresh() {
        let (_dir, store) = store();
        let session = store.load_current(CompactionMode::Smart);
        assert!(session.turns().is_empty());
    }

    #[test]
    fn undecodable_snapshot_starts_fresh() {
        let (_dir, store) = store();
        let c = compactor();
        let mut session = Session::fresh(CompactionMode::Smart);
        let _ = c.record_turn(&mut session, Role::User, "hello");
        let path = store.save(&mut session, &c).unwrap();

        std::fs::write(&path, "this line has no delimiter at all").unwrap();

        let loaded = store.load_current(CompactionMode::Smart);
        assert!(loaded.turns().is_empty(), "corrupt snapshot must read as fresh");
    }

    #[test]
    fn dangling_pointer_starts_fresh() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.dir().join(CURRENT_POINTER), "gone.flat").unwrap();

        let loaded = store.load_current(CompactionMode::Smart);
        assert!(loaded.turns().is_empty());
    }

    // -- hard limit --

    #[test]
    fn oversized_context_fails_save() {
        let (_dir, store) = store();
        let c = ContextCompactor::new(CompactionSettings {
            threshold_tokens: 10,
            hard_limit_tokens: 20,
            preserve_recent_exchanges: 2,
            ..CompactionSettings::default()
        });
        let mut session = Session::fresh(CompactionMode::Smart);
        // The preserved tail alone blows the tiny hard limit.
        session.push_turn(Role::User, "x", 500);
        session.push_turn(Role::Assistant, "y", 500);

        let err = store.save(&mut session, &c).unwrap_err();
        assert_matches!(err, SessionError::ContextTooLarge { limit: 20, .. });
    }

    #[test]
    fn never_mode_skips_hard_limit() {
        let (_dir, store) = store();
        let c = ContextCompactor::new(CompactionSettings {
            threshold_tokens: 10,
            hard_limit_tokens: 20,
            ..CompactionSettings::default()
        });
        let mut session = Session::fresh(CompactionMode::Never);
        session.push_turn(Role::User, "x", 500);

        assert!(store.save(&mut session, &c).is_ok());
    }

    // -- list --

    #[test]
    fn list_newest_first() {
        let (_dir, store) = store();
        let c = compactor();
        let mut session = Session::fresh(CompactionMode::Smart);
        let _ = c.record_turn(&mut session, Role::User, "one");
        let first = store.save(&mut session, &c).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = store.save(&mut session, &c).unwrap();

        let listed = store.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0], second);
        assert_eq!(listed[1], first);
    }

    #[test]
    fn list_empty_store() {
        let (_dir, store) = store();
        assert!(store.list().is_empty());
    }
}
