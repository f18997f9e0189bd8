//! # moat-settings
//!
//! Configuration consumed by the moat core: compaction mode and budgets,
//! the sandbox escape permission, ignore patterns for the workspace
//! fingerprint, and cache retention limits.
//!
//! Loading is layered: compiled defaults, deep-merged with the user's
//! `~/.moat/settings.json`, then `MOAT_*` environment overrides on top.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{load_settings, load_settings_from_path, settings_path};
pub use types::{
    CacheSettings, CompactionMode, CompactionSettings, FilesSettings, MoatSettings,
    SandboxSettings,
};
