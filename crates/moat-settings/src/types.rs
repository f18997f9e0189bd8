//! Settings type tree.
//!
//! Every section derives serde with camelCase field names and per-field
//! defaults, so a partial user file only overrides what it mentions.

use serde::{Deserialize, Serialize};

/// Root of the moat settings tree.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MoatSettings {
    /// Context compaction settings.
    pub compaction: CompactionSettings,
    /// Sandbox boundary settings.
    pub sandbox: SandboxSettings,
    /// Workspace fingerprint settings.
    pub files: FilesSettings,
    /// Response cache settings.
    pub cache: CacheSettings,
}

/// When conversation history is compacted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompactionMode {
    /// Compact on every snapshot save.
    Always,
    /// Compact only once the size estimate crosses the threshold.
    #[default]
    Smart,
    /// Never compact.
    Never,
}

/// Context compaction settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompactionSettings {
    /// Compaction mode.
    pub mode: CompactionMode,
    /// Estimated token count that triggers a compaction pass.
    pub threshold_tokens: u32,
    /// Estimated token count that is fatal even after compaction.
    pub hard_limit_tokens: u32,
    /// Number of recent user/assistant exchanges kept verbatim.
    pub preserve_recent_exchanges: usize,
    /// Approximate characters per token for the size estimate.
    pub chars_per_token: u32,
}

impl Default for CompactionSettings {
    fn default() -> Self {
        Self {
            mode: CompactionMode::Smart,
            threshold_tokens: 12_000,
            hard_limit_tokens: 20_000,
            preserve_recent_exchanges: 3,
            chars_per_token: 4,
        }
    }
}

/// Sandbox boundary settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SandboxSettings {
    /// Whether the escape confirmation flow may be offered at all.
    ///
    /// This flag never enables escape by itself; escape requires the typed
    /// confirmation at runtime.
    pub allow_escape: bool,
}

/// Workspace fingerprint settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilesSettings {
    /// Directory names excluded from the workspace fingerprint.
    pub ignore_patterns: Vec<String>,
}

impl Default for FilesSettings {
    fn default() -> Self {
        Self {
            ignore_patterns: [
                ".git",
                "__pycache__",
                ".venv",
                "venv",
                "env",
                "node_modules",
                ".idea",
                ".vscode",
                "build",
                "dist",
                "target",
            ]
            .map(str::to_owned)
            .to_vec(),
        }
    }
}

/// Response cache settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheSettings {
    /// Whether response caching is enabled.
    pub enabled: bool,
    /// Entries older than this are pruned.
    pub max_age_days: u32,
    /// Oldest entries are evicted once total size exceeds this.
    pub max_size_mb: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_age_days: 30,
            max_size_mb: 500,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compaction_defaults() {
        let c = CompactionSettings::default();
        assert_eq!(c.mode, CompactionMode::Smart);
        assert_eq!(c.threshold_tokens, 12_000);
        assert_eq!(c.hard_limit_tokens, 20_000);
        assert_eq!(c.preserve_recent_exchanges, 3);
        assert_eq!(c.chars_per_token, 4);
    }

    #[test]
    fn compaction_serde_camel_case() {
        let json = serde_json::to_value(CompactionSettings::default()).unwrap();
        assert!(json.get("thresholdTokens").is_some());
        assert!(json.get("hardLimitTokens").is_some());
        assert!(json.get("preserveRecentExchanges").is_some());
    }

    #[test]
    fn compaction_mode_lowercase() {
        assert_eq!(
            serde_json::to_string(&CompactionMode::Smart).unwrap(),
            "\"smart\""
        );
        let back: CompactionMode = serde_json::from_str("\"never\"").unwrap();
        assert_eq!(back, CompactionMode::Never);
    }

    #[test]
    fn sandbox_escape_defaults_off() {
        assert!(!SandboxSettings::default().allow_escape);
    }

    #[test]
    fn files_defaults_cover_common_caches() {
        let f = FilesSettings::default();
        assert!(f.ignore_patterns.iter().any(|p| p == ".git"));
        assert!(f.ignore_patterns.iter().any(|p| p == "node_modules"));
        assert!(f.ignore_patterns.iter().any(|p| p == "target"));
    }

    #[test]
    fn cache_defaults() {
        let c = CacheSettings::default();
        assert!(c.enabled);
        assert_eq!(c.max_age_days, 30);
        assert_eq!(c.max_size_mb, 500);
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let json = serde_json::json!({
            "compaction": { "thresholdTokens": 8000 }
        });
        let s: MoatSettings = serde_json::from_value(json).unwrap();
        assert_eq!(s.compaction.threshold_tokens, 8000);
        assert_eq!(s.compaction.hard_limit_tokens, 20_000);
        assert!(s.cache.enabled);
    }
}
