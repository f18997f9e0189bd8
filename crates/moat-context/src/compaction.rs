//! Compaction engine for bounding conversation size.
//!
//! ## Algorithm
//!
//! 1. Split turns into "to summarize" (older) and "to preserve" (recent
//!    exchanges), always keeping the most recent user turn preserved.
//! 2. Collapse the older turns into a timeline of truncated one-line
//!    entries, newest last.
//! 3. Replace them with a single synthesized recap turn followed by the
//!    preserved turns verbatim.
//!
//! Compaction is a synchronous, local transform: no network, no
//! summarizer round-trip. A session over the threshold is compacted in the
//! same call that pushed it over.

use moat_codec::estimate_tokens_with;
use moat_core::text::{flatten_newlines, truncate_with_suffix};
use moat_settings::{CompactionMode, CompactionSettings};
use tracing::{debug, info};

use crate::constants::{
    COMPACTION_SUMMARY_PREFIX, TIMELINE_ENTRY_MAX_BYTES, TIMELINE_MAX_ENTRIES,
};
use crate::session::{Role, Session, SessionState, Turn};

/// Result of a compaction request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompactionOutcome {
    /// Whether a pass actually rewrote the turn sequence.
    pub compacted: bool,
    /// Number of turns collapsed into the recap.
    pub summarized_turns: usize,
    /// Cumulative estimate before the request.
    pub tokens_before: u32,
    /// Cumulative estimate after the request.
    pub tokens_after: u32,
}

impl CompactionOutcome {
    fn unchanged(session: &Session) -> Self {
        Self {
            compacted: false,
            summarized_turns: 0,
            tokens_before: session.estimated_tokens(),
            tokens_after: session.estimated_tokens(),
        }
    }
}

/// Maintains the conversation size budget for sessions.
///
/// Holds the configured thresholds; all state lives in the [`Session`]
/// passed into each call.
#[derive(Clone, Debug)]
pub struct ContextCompactor {
    settings: CompactionSettings,
}

impl ContextCompactor {
    /// Create a compactor with the given settings.
    #[must_use]
    pub fn new(settings: CompactionSettings) -> Self {
        Self { settings }
    }

    /// The configured settings.
    #[must_use]
    pub fn settings(&self) -> &CompactionSettings {
        &self.settings
    }

    /// Record a turn, compacting synchronously if the push crosses the
    /// size threshold.
    ///
    /// Returns the pass outcome when one ran, `None` otherwise. Sessions
    /// in `never` mode are left verbatim no matter the size.
    pub fn record_turn(
        &self,
        session: &mut Session,
        role: Role,
        content: impl Into<String>,
    ) -> Option<CompactionOutcome> {
        let content = content.into();
        let estimate = estimate_tokens_with(&content, self.settings.chars_per_token);
        session.push_turn(role, content, estimate);

        if session.mode != CompactionMode::Never
            && session.estimated_tokens() > self.settings.threshold_tokens
        {
            return Some(self.run_pass(session));
        }
        None
    }

    /// Apply the session's compaction mode.
    ///
    /// `never` is a no-op; `smart` compacts only above the threshold;
    /// `always` compacts unconditionally.
    pub fn compact(&self, session: &mut Session) -> CompactionOutcome {
        match session.mode {
            CompactionMode::Never => CompactionOutcome::unchanged(session),
            CompactionMode::Smart => {
                if session.estimated_tokens() > self.settings.threshold_tokens {
                    self.run_pass(session)
                } else {
                    CompactionOutcome::unchanged(session)
                }
            }
            CompactionMode::Always => self.run_pass(session),
        }
    }

    /// One compaction pass: recap older turns, keep the recent tail.
    ///
    /// Always preserves the most recent user turn and never touches the
    /// session's pending files delta.
    fn run_pass(&self, session: &mut Session) -> CompactionOutcome {
        session.set_state(SessionState::Compressing);
        let tokens_before = session.estimated_tokens();

        let turns = session.turns().to_vec();
        let preserve_count = self.settings.preserve_recent_exchanges * 2;

        let mut split_at = turns.len().saturating_sub(preserve_count);

        // The latest user turn must survive, even behind a run of
        // assistant turns longer than the preserve window.
        if let Some(last_user) = turns.iter().rposition(|t| t.role == Role::User) {
            split_at = split_at.min(last_user);
        }

        if split_at == 0 {
            debug!(
                total_turns = turns.len(),
                preserve_count, "compaction skipped: all turns within preserve window"
            );
            session.set_state(SessionState::Tracking);
            return CompactionOutcome::unchanged(session);
        }

        let (older, preserved) = turns.split_at(split_at);

        let timeline: Vec<String> = older
            .iter()
            .map(|t| truncate_with_suffix(&flatten_newlines(&t.content), TIMELINE_ENTRY_MAX_BYTES, "..."))
            .collect();
        let newest = timeline.len().saturating_sub(TIMELINE_MAX_ENTRIES);

        let mut recap = String::from(COMPACTION_SUMMARY_PREFIX);
        for entry in &timeline[newest..] {
            recap.push('\n');
            recap.push_str("- ");
            recap.push_str(entry);
        }

        let recap_estimate = estimate_tokens_with(&recap, self.settings.chars_per_token);
        let mut new_turns = Vec::with_capacity(1 + preserved.len());
        new_turns.push(Turn {
            role: Role::User,
            content: recap,
            estimated_tokens: recap_estimate,
        });
        new_turns.extend_from_slice(preserved);
        session.set_turns(new_turns);
        session.set_state(SessionState::Tracking);

        let tokens_after = session.estimated_tokens();
        info!(
            summarized_turns = split_at,
            tokens_before,
            tokens_after,
            tokens_saved = tokens_before.saturating_sub(tokens_after),
            "compaction pass complete"
        );

        CompactionOutcome {
            compacted: true,
            summarized_turns: split_at,
            tokens_before,
            tokens_after,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(threshold: u32, preserve: usize) -> CompactionSettings {
        CompactionSettings {
            mode: CompactionMode::Smart,
            threshold_tokens: threshold,
            hard_limit_tokens: threshold.saturating_mul(2),
            preserve_recent_exchanges: preserve,
            chars_per_token: 4,
        }
    }

    fn filled_session(mode: CompactionMode, exchanges: usize) -> Session {
        let mut s = Session::fresh(mode);
        let compactor = ContextCompactor::new(settings(u32::MAX, 1));
        for i in 0..exchanges {
            let _ = compactor.record_turn(&mut s, Role::User, format!("user question {i}"));
            let _ = compactor.record_turn(&mut s, Role::Assistant, format!("assistant answer {i}"));
        }
        s
    }

    // -- record_turn / smart threshold --

    #[test]
    fn below_threshold_stays_verbatim() {
        let compactor = ContextCompactor::new(settings(10_000, 3));
        let mut s = Session::fresh(CompactionMode::Smart);

        assert!(compactor.record_turn(&mut s, Role::User, "short question").is_none());
        assert!(compactor.record_turn(&mut s, Role::Assistant, "short answer").is_none());

        assert_eq!(s.turns().len(), 2);
        assert_eq!(s.turns()[0].content, "short question");
        assert_eq!(s.state(), SessionState::Tracking);
    }

    #[test]
    fn crossing_threshold_triggers_one_pass() {
        let compactor = ContextCompactor::new(settings(40, 1));
        let mut s = Session::fresh(CompactionMode::Smart);
        s.set_files_delta(vec!["+new.rs".into()]);

        let mut outcomes = Vec::new();
        for i in 0..6 {
            outcomes.push(compactor.record_turn(&mut s, Role::User, format!("question number {i}")));
            outcomes.push(compactor.record_turn(&mut s, Role::Assistant, format!("answer number {i}")));
        }

        let passes: Vec<&CompactionOutcome> =
            outcomes.iter().flatten().filter(|o| o.compacted).collect();
        assert!(!passes.is_empty(), "threshold crossing must compact");

        // Recap turn sits first, latest user turn survives, delta untouched.
        assert!(s.turns()[0].content.starts_with(COMPACTION_SUMMARY_PREFIX));
        assert!(s.last_user_turn().is_some());
        assert_eq!(s.files_delta(), &["+new.rs".to_owned()][..]);
    }

    #[test]
    fn never_mode_never_compacts() {
        let compactor = ContextCompactor::new(settings(10, 1));
        let mut s = Session::fresh(CompactionMode::Never);

        for i in 0..10 {
            let outcome =
                compactor.record_turn(&mut s, Role::User, format!("a long enough message {i}"));
            assert!(outcome.is_none());
        }
        assert_eq!(s.turns().len(), 10);

        let outcome = compactor.compact(&mut s);
        assert!(!outcome.compacted);
        assert_eq!(s.turns().len(), 10);
    }

    // -- compact / modes --

    #[test]
    fn always_mode_compacts_below_threshold() {
        let compactor = ContextCompactor::new(settings(u32::MAX, 1));
        let mut s = filled_session(CompactionMode::Always, 5);

        let outcome = compactor.compact(&mut s);

        assert!(outcome.compacted);
        // recap + 1 preserved exchange
        assert_eq!(s.turns().len(), 3);
        assert!(s.turns()[0].content.starts_with(COMPACTION_SUMMARY_PREFIX));
    }

    #[test]
    fn smart_mode_skips_below_threshold() {
        let compactor = ContextCompactor::new(settings(u32::MAX, 1));
        let mut s = filled_session(CompactionMode::Smart, 5);

        let outcome = compactor.compact(&mut s);
        assert!(!outcome.compacted);
        assert_eq!(s.turns().len(), 10);
    }

    #[test]
    fn within_preserve_window_is_a_no_op() {
        let compactor = ContextCompactor::new(settings(u32::MAX, 5));
        let mut s = filled_session(CompactionMode::Always, 2);

        let outcome = compactor.compact(&mut s);
        assert!(!outcome.compacted);
        assert_eq!(outcome.tokens_before, outcome.tokens_after);
        assert_eq!(s.state(), SessionState::Tracking);
    }

    // -- preservation guarantees --

    #[test]
    fn latest_user_turn_survives_assistant_run() {
        let compactor = ContextCompactor::new(settings(u32::MAX, 1));
        let mut s = Session::fresh(CompactionMode::Always);
        let inner = ContextCompactor::new(settings(u32::MAX, 1));
        let _ = inner.record_turn(&mut s, Role::User, "early question");
        let _ = inner.record_turn(&mut s, Role::User, "the real question");
        let _ = inner.record_turn(&mut s, Role::Assistant, "thinking aloud one");
        let _ = inner.record_turn(&mut s, Role::Assistant, "thinking aloud two");
        let _ = inner.record_turn(&mut s, Role::Assistant, "final answer");

        let outcome = compactor.compact(&mut s);

        assert!(outcome.compacted);
        let contents: Vec<&str> = s.turns().iter().map(|t| t.content.as_str()).collect();
        assert!(contents.contains(&"the real question"));
        assert!(!contents.contains(&"early question"));
    }

    #[test]
    fn recap_entries_are_flattened_and_truncated() {
        let compactor = ContextCompactor::new(settings(u32::MAX, 1));
        let mut s = Session::fresh(CompactionMode::Always);
        let long = format!("line one\nline two {}", "x".repeat(100));
        let _ = compactor.record_turn(&mut s, Role::User, long);
        let _ = compactor.record_turn(&mut s, Role::Assistant, "ack");
        let _ = compactor.record_turn(&mut s, Role::User, "next");
        let _ = compactor.record_turn(&mut s, Role::Assistant, "done");

        let _ = compactor.compact(&mut s);

        let recap = &s.turns()[0].content;
        let entry = recap.lines().nth(1).unwrap();
        assert!(entry.starts_with("- line one line two"));
        assert!(entry.ends_with("..."));
        assert!(entry.len() <= 2 + TIMELINE_ENTRY_MAX_BYTES);
    }

    #[test]
    fn timeline_keeps_newest_entries() {
        let compactor = ContextCompactor::new(settings(u32::MAX, 1));
        let mut s = Session::fresh(CompactionMode::Always);
        for i in 0..20 {
            let _ = compactor.record_turn(&mut s, Role::User, format!("msg {i}"));
        }
        let _ = compactor.record_turn(&mut s, Role::Assistant, "tail answer");
        let _ = compactor.record_turn(&mut s, Role::User, "tail question");

        let _ = compactor.compact(&mut s);

        let recap = &s.turns()[0].content;
        let entries: Vec<&str> = recap.lines().skip(1).collect();
        assert!(entries.len() <= TIMELINE_MAX_ENTRIES);
        // Newest summarized turns are retained, oldest dropped.
        assert!(entries.contains(&"- msg 19"));
        assert!(!entries.contains(&"- msg 0"));
    }

    #[test]
    fn pass_reduces_estimate() {
        let compactor = ContextCompactor::new(settings(u32::MAX, 1));
        let mut s = Session::fresh(CompactionMode::Always);
        for i in 0..10 {
            let _ = compactor.record_turn(
                &mut s,
                Role::User,
                format!("a moderately verbose message about topic {i} with extra words"),
            );
            let _ = compactor.record_turn(&mut s, Role::Assistant, "a similarly verbose response with plenty of words in it");
        }

        let outcome = compactor.compact(&mut s);
        assert!(outcome.compacted);
        assert!(outcome.tokens_after < outcome.tokens_before);
        assert_eq!(s.estimated_tokens(), outcome.tokens_after);
    }
}
