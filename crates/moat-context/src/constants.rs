//! Context subsystem constants.

/// First line of the synthesized recap turn produced by compaction.
pub const COMPACTION_SUMMARY_PREFIX: &str = "[Recap of earlier conversation]";

/// Maximum number of timeline entries kept in a recap turn (newest last).
pub const TIMELINE_MAX_ENTRIES: usize = 15;

/// Byte budget for a single timeline entry, including the ellipsis.
pub const TIMELINE_ENTRY_MAX_BYTES: usize = 53;

/// Name of the pointer file that resolves to the latest snapshot.
pub const CURRENT_POINTER: &str = "current";

/// Timestamp format for snapshot file names (filesystem-safe, sortable).
pub const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recap_prefix_non_empty() {
        assert!(!COMPACTION_SUMMARY_PREFIX.is_empty());
    }

    #[test]
    fn timeline_entry_budget_fits_truncation_suffix() {
        assert!(TIMELINE_ENTRY_MAX_BYTES > "...".len());
    }
}
