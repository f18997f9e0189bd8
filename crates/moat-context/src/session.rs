//! Session state: ordered turns, size estimates, and the flat-document
//! mapping used for persistence.

use moat_codec::{Document, Value, estimate_tokens};
use moat_core::ids::SessionId;
use moat_settings::CompactionMode;

/// Who produced a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// The human driving the assistant.
    User,
    /// The remote model.
    Assistant,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Parse a wire name back into a role.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

/// One conversational turn with its cached size estimate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    /// Who produced the turn.
    pub role: Role,
    /// Raw turn content.
    pub content: String,
    /// Cheap local size estimate (characters, not a remote tokenizer).
    pub estimated_tokens: u32,
}

/// Lifecycle of a session's size tracking.
///
/// `Fresh` until the first recorded turn, `Tracking` while under budget,
/// `Compressing` only for the duration of a synchronous compaction pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No turns recorded yet.
    #[default]
    Fresh,
    /// Accumulating turns under the size budget.
    Tracking,
    /// A compaction pass is running.
    Compressing,
}

/// A conversation session bound to one working directory.
///
/// Mutated by every turn and by compaction passes; persisted as a snapshot
/// document and superseded (never deleted) by later snapshots.
#[derive(Clone, Debug)]
pub struct Session {
    /// Session identifier.
    pub id: SessionId,
    /// Compaction mode this session was created with.
    pub mode: CompactionMode,
    turns: Vec<Turn>,
    estimated_tokens: u32,
    state: SessionState,
    /// Digest over the filtered workspace listing at last refresh.
    pub files_hash: Option<String>,
    /// The filtered workspace listing backing [`Session::files_hash`].
    pub files: Vec<String>,
    files_delta: Vec<String>,
}

impl Session {
    /// Create an empty session in the `Fresh` state.
    #[must_use]
    pub fn fresh(mode: CompactionMode) -> Self {
        Self {
            id: SessionId::new(),
            mode,
            turns: Vec::new(),
            estimated_tokens: 0,
            state: SessionState::Fresh,
            files_hash: None,
            files: Vec::new(),
            files_delta: Vec::new(),
        }
    }

    /// The ordered turn sequence.
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Cumulative size estimate across all turns.
    #[must_use]
    pub fn estimated_tokens(&self) -> u32 {
        self.estimated_tokens
    }

    /// Current tracking state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Pending workspace drift entries (`+added` / `-removed`), if any.
    #[must_use]
    pub fn files_delta(&self) -> &[String] {
        &self.files_delta
    }

    /// Replace the pending drift entries.
    pub fn set_files_delta(&mut self, delta: Vec<String>) {
        self.files_delta = delta;
    }

    /// Remove and return the pending drift entries.
    pub fn take_files_delta(&mut self) -> Vec<String> {
        std::mem::take(&mut self.files_delta)
    }

    /// Append a turn with a precomputed size estimate.
    ///
    /// Moves a `Fresh` session to `Tracking`. Threshold-triggered
    /// compaction lives in the compactor, which is the normal entry point
    /// for recording turns.
    pub fn push_turn(&mut self, role: Role, content: impl Into<String>, estimated_tokens: u32) {
        self.turns.push(Turn {
            role,
            content: content.into(),
            estimated_tokens,
        });
        self.estimated_tokens = self.estimated_tokens.saturating_add(estimated_tokens);
        if self.state == SessionState::Fresh {
            self.state = SessionState::Tracking;
        }
    }

    /// Replace the turn sequence, recomputing the cumulative estimate.
    pub fn set_turns(&mut self, turns: Vec<Turn>) {
        self.estimated_tokens = turns
            .iter()
            .fold(0u32, |acc, t| acc.saturating_add(t.estimated_tokens));
        self.turns = turns;
    }

    pub(crate) fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    /// The most recent user turn, if any.
    #[must_use]
    pub fn last_user_turn(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.role == Role::User)
    }

    // ─── Document mapping ────────────────────────────────────────────────

    /// Serialize this session into a flat document.
    ///
    /// Turns become `turn_NNN_<role>` keys; empty fields are omitted.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("id", self.id.as_str());
        doc.insert("mode", mode_str(self.mode));

        for (i, turn) in self.turns.iter().enumerate() {
            doc.insert(format!("turn_{i:03}_{}", turn.role.as_str()), turn.content.as_str());
        }

        if let Some(hash) = &self.files_hash {
            doc.insert("files_hash", hash.as_str());
        }
        if !self.files.is_empty() {
            doc.insert("files", Value::List(self.files.clone()));
        }
        if !self.files_delta.is_empty() {
            doc.insert("files.delta", Value::List(self.files_delta.clone()));
        }

        doc
    }

    /// Rebuild a session from a flat document.
    ///
    /// Lenient by design: unknown keys are ignored, a missing id gets a
    /// fresh one, and turn size estimates are recomputed locally.
    #[must_use]
    pub fn from_document(doc: &Document, default_mode: CompactionMode) -> Self {
        let id = doc
            .get_scalar("id")
            .map_or_else(SessionId::new, SessionId::from);
        let mode = doc
            .get_scalar("mode")
            .and_then(moat_settings::loader::parse_compaction_mode)
            .unwrap_or(default_mode);

        let mut session = Self::fresh(mode);
        session.id = id;

        // BTreeMap iteration keeps zero-padded turn keys in order.
        for (key, value) in doc.iter() {
            let Some(rest) = key.strip_prefix("turn_") else {
                continue;
            };
            let Some((_, role_name)) = rest.split_once('_') else {
                continue;
            };
            let Some(role) = Role::parse(role_name) else {
                continue;
            };
            let content = value_text(value);
            let estimate = estimate_tokens(&content);
            session.push_turn(role, content, estimate);
        }

        session.files_hash = doc.get_scalar("files_hash").map(ToOwned::to_owned);
        session.files = value_items(doc.get("files"));
        session.files_delta = value_items(doc.get("files.delta"));

        session
    }
}

/// Wire name of a compaction mode.
#[must_use]
pub fn mode_str(mode: CompactionMode) -> &'static str {
    match mode {
        CompactionMode::Always => "always",
        CompactionMode::Smart => "smart",
        CompactionMode::Never => "never",
    }
}

/// Flatten a document value to text (lists rejoin with `", "`).
fn value_text(value: &Value) -> String {
    match value {
        Value::Scalar(s) => s.clone(),
        Value::List(items) => items.join(", "),
    }
}

/// Read a document value as a list of items (a scalar is a one-item list).
fn value_items(value: Option<&Value>) -> Vec<String> {
    match value {
        None => Vec::new(),
        Some(Value::Scalar(s)) if s.is_empty() => Vec::new(),
        Some(Value::Scalar(s)) => vec![s.clone()],
        Some(Value::List(items)) => items.clone(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
