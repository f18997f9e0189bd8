//! Encode/decode between [`Document`] and the flat line-oriented text form.
//!
//! ## Wire format
//!
//! ```text
//! # comment lines are ignored
//! cwd: /home/user/project
//! decisions: sandbox,flat-codec,cache
//! description: first line
//!   continuation lines are indented two spaces
//! ```
//!
//! - one `key: value` entry per line, keys emitted in lexicographic order
//! - lists are comma-joined with no spaces
//! - a value containing newlines continues on two-space-indented lines
//! - a value containing `,` (and no newline) decodes as a list
//!
//! Encoding equal documents always yields byte-identical text; decoding
//! rejects lines without a `:` and repeated keys outright.

use crate::document::{Document, Value};
use crate::errors::CodecError;

/// Serialize a document to flat text.
///
/// Output is a pure function of the document's sorted entries: equal
/// documents encode byte-identically regardless of how they were built.
#[must_use]
pub fn encode(doc: &Document) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(doc.len());

    for (key, value) in doc.iter() {
        let rendered = match value {
            Value::Scalar(s) => s.clone(),
            Value::List(items) => items.join(","),
        };

        let mut parts = rendered.split('\n');
        let first = parts.next().unwrap_or_default();
        lines.push(format!("{key}: {first}"));
        for part in parts {
            lines.push(format!("  {part}"));
        }
    }

    if lines.is_empty() {
        String::new()
    } else {
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

/// Parse flat text into a document.
///
/// Blank lines and lines whose first non-space character is `#` are
/// skipped. Indented lines (two spaces or a tab) continue the previous
/// value. Anything else must be a `key: value` line.
///
/// # Errors
///
/// [`CodecError::MissingDelimiter`] for a content line without `:`;
/// [`CodecError::DuplicateKey`] when a key repeats — duplicates are never
/// resolved by last-write-wins.
pub fn decode(text: &str) -> Result<Document, CodecError> {
    let mut doc = Document::new();
    // (key, accumulated value, line the key appeared on)
    let mut pending: Option<(String, String, usize)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end();

        if line.trim_start().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        if let Some((_, value, _)) = pending.as_mut() {
            if let Some(rest) = continuation_content(line) {
                value.push('\n');
                value.push_str(rest);
                continue;
            }
        }

        let Some((key, value)) = line.split_once(':') else {
            return Err(CodecError::MissingDelimiter {
                line: line_no,
                content: line.to_owned(),
            });
        };

        flush(&mut doc, pending.take())?;
        pending = Some((key.trim().to_owned(), value.trim().to_owned(), line_no));
    }

    flush(&mut doc, pending.take())?;
    Ok(doc)
}

/// Strip the indentation marker from a continuation line, if it is one.
fn continuation_content(line: &str) -> Option<&str> {
    line.strip_prefix("  ").or_else(|| line.strip_prefix('\t'))
}

/// Commit a pending entry, classifying its value as scalar or list.
fn flush(doc: &mut Document, pending: Option<(String, String, usize)>) -> Result<(), CodecError> {
    let Some((key, value, line)) = pending else {
        return Ok(());
    };

    if doc.contains_key(&key) {
        return Err(CodecError::DuplicateKey { line, key });
    }

    // Comma-separated single-line values are lists; multi-line values are
    // always scalars (commas are legal inside them).
    let parsed = if value.contains(',') && !value.contains('\n') {
        Value::List(
            value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(ToOwned::to_owned)
                .collect(),
        )
    } else {
        Value::Scalar(value)
    };

    doc.insert(key, parsed);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
