//! Error types for the flat-text codec.

use thiserror::Error;

/// A document failed to decode.
///
/// Both variants are hard errors: the codec never guesses at intent. Callers
/// loading session snapshots recover by treating the snapshot as absent;
/// explicit decode requests surface the error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// A non-blank, non-comment line has no `:` delimiter.
    #[error("malformed document at line {line}: missing ':' delimiter in {content:?}")]
    MissingDelimiter {
        /// 1-based line number within the input.
        line: usize,
        /// The offending line content.
        content: String,
    },

    /// The same key appears on more than one line.
    ///
    /// Duplicate keys are never resolved by last-write-wins.
    #[error("malformed document at line {line}: duplicate key {key:?}")]
    DuplicateKey {
        /// 1-based line number of the second occurrence.
        line: usize,
        /// The repeated key.
        key: String,
    },
}
