//! Path canonicalization that tolerates not-yet-existing tails.
//!
//! `std::fs::canonicalize` fails on paths that do not exist, but the guard
//! must authorize write targets before they are created. The strategy here:
//! lexically resolve `.` and `..` first, then canonicalize the longest
//! existing prefix through the OS (resolving symlinks) and re-append the
//! missing tail. Resolving dot-dot segments before symlinks is the
//! conservative order for a boundary check: a `..` can never ride a symlink
//! out of the tree unseen.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components without touching the filesystem.
///
/// A `..` at the root is dropped (as the OS would).
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                // Pop a normal component; keep leading roots/prefixes.
                match parts.last() {
                    Some(Component::Normal(_)) => {
                        let _ = parts.pop();
                    }
                    Some(Component::RootDir | Component::Prefix(_)) | None => {}
                    _ => {
                        let _ = parts.pop();
                    }
                }
            }
            Component::CurDir => {}
            _ => parts.push(component),
        }
    }
    parts.iter().map(|c| c.as_os_str()).collect()
}

/// Fully canonicalize `path`, allowing a non-existing tail.
///
/// The path must already be absolute. `..` and `.` are resolved lexically,
/// the longest existing prefix is canonicalized through the OS (following
/// symlinks), and any remaining components are appended verbatim.
pub fn canonicalize_lenient(path: &Path) -> std::io::Result<PathBuf> {
    debug_assert!(path.is_absolute(), "candidate must be absolute by now");
    let normalized = normalize(path);

    let mut existing = normalized.clone();
    let mut tail: Vec<OsString> = Vec::new();

    loop {
        match std::fs::canonicalize(&existing) {
            Ok(mut canonical) => {
                for component in tail.iter().rev() {
                    canonical.push(component);
                }
                return Ok(canonical);
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        tail.push(name.to_owned());
                        existing = parent.to_path_buf();
                    }
                    // Walked all the way up without finding anything real.
                    _ => return Ok(normalized),
                }
            }
            Err(err) => return Err(err),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // -- normalize --

    #[test]
    fn normalize_parent_dirs() {
        assert_eq!(normalize(Path::new("/foo/bar/../baz")), PathBuf::from("/foo/baz"));
    }

    #[test]
    fn normalize_cur_dirs() {
        assert_eq!(normalize(Path::new("/foo/./bar")), PathBuf::from("/foo/bar"));
    }

    #[test]
    fn normalize_parent_at_root_is_dropped() {
        assert_eq!(normalize(Path::new("/../etc")), PathBuf::from("/etc"));
        assert_eq!(normalize(Path::new("/../../etc")), PathBuf::from("/etc"));
    }

    #[test]
    fn normalize_chained_parents() {
        assert_eq!(
            normalize(Path::new("/a/b/c/../../d")),
            PathBuf::from("/a/d")
        );
    }

    #[test]
    fn normalize_untouched_path() {
        assert_eq!(normalize(Path::new("/a/b/c")), PathBuf::from("/a/b/c"));
    }

    // -- canonicalize_lenient --

    #[test]
    fn existing_directory_canonicalizes() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = canonicalize_lenient(dir.path()).unwrap();
        assert_eq!(resolved, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn missing_tail_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let root = std::fs::canonicalize(dir.path()).unwrap();
        let target = dir.path().join("not").join("yet").join("created.txt");
        let resolved = canonicalize_lenient(&target).unwrap();
        assert_eq!(resolved, root.join("not").join("yet").join("created.txt"));
    }

    #[test]
    fn dotdot_resolved_before_prefix_walk() {
        let dir = tempfile::tempdir().unwrap();
        let root = std::fs::canonicalize(dir.path()).unwrap();
        let target = dir.path().join("sub").join("..").join("file.txt");
        let resolved = canonicalize_lenient(&target).unwrap();
        assert_eq!(resolved, root.join("file.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_in_existing_prefix_is_followed() {
        let outside = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(outside.path(), &link).unwrap();

        let resolved = canonicalize_lenient(&link.join("new.txt")).unwrap();
        let outside_canonical = std::fs::canonicalize(outside.path()).unwrap();
        assert_eq!(resolved, outside_canonical.join("new.txt"));
    }
}
