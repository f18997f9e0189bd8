//! # moat-context
//!
//! Bounded conversational context for the moat assistant.
//!
//! A [`session::Session`] accumulates user/assistant turns with cheap local
//! size estimates; the [`compaction::ContextCompactor`] keeps the estimate
//! under a configured budget by collapsing older turns into one synthesized
//! recap turn while recent exchanges stay verbatim. Sessions persist as
//! flat-text snapshots named by timestamp with a `current` pointer, and a
//! workspace fingerprint detects file drift between resumes, recorded as a
//! compact `+added,-removed` delta rather than a fresh tree listing.
//!
//! Nothing in this crate performs network I/O; an unreadable or
//! undecodable snapshot starts a fresh session instead of failing.

#![deny(unsafe_code)]

pub mod compaction;
pub mod constants;
pub mod errors;
pub mod files;
pub mod session;
pub mod snapshot;

pub use compaction::{CompactionOutcome, ContextCompactor};
pub use errors::SessionError;
pub use files::{FilesFingerprint, files_fingerprint, listing_delta, refresh_files};
pub use session::{Role, Session, SessionState, Turn};
pub use snapshot::SnapshotStore;
