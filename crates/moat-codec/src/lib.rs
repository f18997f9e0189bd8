//! # moat-codec
//!
//! Deterministic, diffable, quote-free text encoding for every structured
//! payload exchanged with the remote model or persisted to disk.
//!
//! A document is a flat mapping of string keys to scalar or list values,
//! serialized one `key: value` line at a time with keys in lexicographic
//! order. Equal mappings always serialize byte-identically regardless of
//! construction order — the property the cache keys and diffable session
//! history depend on.
//!
//! The grammar trades escaping for token economy: there are no quotes and
//! no delimiter escapes. See [`Document`] for the exact limits of what
//! round-trips.

#![deny(unsafe_code)]

pub mod codec;
pub mod document;
pub mod errors;
pub mod estimate;

pub use codec::{decode, encode};
pub use document::{Document, Value};
pub use errors::CodecError;
pub use estimate::{DEFAULT_CHARS_PER_TOKEN, estimate_tokens, estimate_tokens_with};

/// File extension for persisted flat-text documents (without the dot).
pub const DOCUMENT_EXTENSION: &str = "flat";
