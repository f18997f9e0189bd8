//! Disk-backed cache store: one JSON entry file per key.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use moat_settings::CacheSettings;

use crate::errors::CacheError;

/// On-disk envelope around a cached payload.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntry {
    /// Write timestamp; eviction order is strictly ascending by this.
    cached_at: DateTime<Utc>,
    /// The memoized response payload.
    payload: serde_json::Value,
}

/// Outcome of a [`CacheStore::prune`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Entries removed because they exceeded the maximum age (plus any
    /// unreadable entries encountered along the way).
    pub expired: usize,
    /// Entries evicted oldest-first to get back under the size budget.
    pub evicted: usize,
}

/// Cache size and age statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entry files.
    pub entries: usize,
    /// Total size of all entry files in bytes.
    pub total_size_bytes: u64,
    /// Write timestamp of the oldest entry, if any.
    pub oldest: Option<DateTime<Utc>>,
}

/// Content-addressable response cache over a directory of entry files.
///
/// Safe for concurrent `get`/`put` from multiple callers: writes go
/// through a temp file and an atomic rename, and identical keys are
/// assumed to carry identical payloads, so concurrent writers can only
/// race toward the same content.
#[derive(Clone, Debug)]
pub struct CacheStore {
    dir: PathBuf,
    enabled: bool,
    max_age: Duration,
    max_size_bytes: u64,
}

impl CacheStore {
    /// Create a store under `dir` with limits from settings.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, settings: &CacheSettings) -> Self {
        Self {
            dir: dir.into(),
            enabled: settings.enabled,
            max_age: Duration::days(i64::from(settings.max_age_days)),
            max_size_bytes: settings.max_size_mb * 1024 * 1024,
        }
    }

    /// Create a store with explicit limits (always enabled).
    #[must_use]
    pub fn with_limits(dir: impl Into<PathBuf>, max_age: Duration, max_size_bytes: u64) -> Self {
        Self {
            dir: dir.into(),
            enabled: true,
            max_age,
            max_size_bytes,
        }
    }

    /// The cache directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Look up a cached payload; a miss is not an error.
    ///
    /// Expired entries are deleted on read. A corrupt or unreadable entry
    /// is deleted and reported as a miss.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        if !self.enabled {
            return None;
        }
        let path = self.entry_path(key);
        let text = std::fs::read_to_string(&path).ok()?;

        let entry: CacheEntry = match serde_json::from_str(&text) {
            Ok(entry) => entry,
            Err(err) => {
                debug!(key, %err, "corrupt cache entry, deleting");
                let _ = std::fs::remove_file(&path);
                return None;
            }
        };

        if Utc::now() - entry.cached_at > self.max_age {
            trace!(key, "cache entry expired, deleting");
            let _ = std::fs::remove_file(&path);
            return None;
        }

        trace!(key, "cache hit");
        Some(entry.payload)
    }

    /// Persist a payload under `key`.
    ///
    /// Idempotent for an existing key: payloads for identical keys are
    /// assumed identical, so last-write-wins. The write is atomic — an
    /// aborted call leaves either the old entry or the new one, never a
    /// partial file.
    pub fn put(&self, key: &str, payload: serde_json::Value) -> Result<(), CacheError> {
        if !self.enabled {
            return Ok(());
        }
        self.write_entry(key, payload, Utc::now())
    }

    /// Remove expired entries, then evict oldest-first until under the
    /// size budget.
    ///
    /// Meant to run opportunistically (startup, periodic), not per write.
    #[must_use]
    pub fn prune(&self) -> PruneReport {
        let mut report = PruneReport::default();
        let mut live: Vec<(PathBuf, DateTime<Utc>, u64)> = Vec::new();
        let now = Utc::now();

        for path in self.entry_files() {
            match read_entry_meta(&path) {
                Some((cached_at, _)) if now - cached_at > self.max_age => {
                    let _ = std::fs::remove_file(&path);
                    report.expired += 1;
                }
                Some((cached_at, size)) => live.push((path, cached_at, size)),
                None => {
                    // Unreadable entries carry no usable timestamp; drop them.
                    let _ = std::fs::remove_file(&path);
                    report.expired += 1;
                }
            }
        }

        let mut total: u64 = live.iter().map(|(_, _, size)| size).sum();
        // Strictly ascending by write timestamp: the oldest goes first.
        live.sort_by_key(|(_, cached_at, _)| *cached_at);

        let mut victims = live.into_iter();
        while total > self.max_size_bytes {
            let Some((path, _, size)) = victims.next() else {
                break;
            };
            let _ = std::fs::remove_file(&path);
            total = total.saturating_sub(size);
            report.evicted += 1;
        }

        if report.expired > 0 || report.evicted > 0 {
            debug!(
                expired = report.expired,
                evicted = report.evicted,
                "cache pruned"
            );
        }
        report
    }

    /// Delete every entry. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut deleted = 0;
        for path in self.entry_files() {
            if std::fs::remove_file(&path).is_ok() {
                deleted += 1;
            }
        }
        deleted
    }

    /// Current entry count, total size, and oldest write timestamp.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        for path in self.entry_files() {
            let Some((cached_at, size)) = read_entry_meta(&path) else {
                continue;
            };
            stats.entries += 1;
            stats.total_size_bytes += size;
            stats.oldest = Some(match stats.oldest {
                Some(oldest) if oldest <= cached_at => oldest,
                _ => cached_at,
            });
        }
        stats
    }

    // ─── Private helpers ─────────────────────────────────────────────────

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn write_entry(
        &self,
        key: &str,
        payload: serde_json::Value,
        cached_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir)?;

        let entry = CacheEntry { cached_at, payload };
        let text = serde_json::to_string(&entry)?;

        let tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        std::fs::write(tmp.path(), text)?;
        let _ = tmp
            .persist(self.entry_path(key))
            .map_err(|err| CacheError::Io(err.error))?;

        trace!(key, "cache entry written");
        Ok(())
    }

    fn entry_files(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect()
    }
}

/// Read an entry's write timestamp and file size; `None` if unreadable.
fn read_entry_meta(path: &Path) -> Option<(DateTime<Utc>, u64)> {
    let size = std::fs::metadata(path).ok()?.len();
    let text = std::fs::read_to_string(path).ok()?;
    let entry: CacheEntry = serde_json::from_str(&text)
        .map_err(|err| {
            warn!(path = %path.display(), %err, "unreadable cache entry");
            err
        })
        .ok()?;
    Some((entry.cached_at, size))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
