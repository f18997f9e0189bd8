//! The flat document model: an always-sorted mapping of keys to values.

use std::collections::BTreeMap;

/// A value in a flat document: a bare scalar or a list of scalars.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// A single string value. May span multiple lines.
    Scalar(String),
    /// A list of string values, serialized comma-separated on one line.
    List(Vec<String>),
}

impl Value {
    /// The scalar content, if this is a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// The list items, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Scalar(_) => None,
            Self::List(items) => Some(items),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Scalar(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_owned())
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// An ordered mapping from string keys to [`Value`]s.
///
/// Keys are held in a `BTreeMap`, so iteration — and therefore encoding —
/// is always in lexicographic key order no matter the insertion order.
///
/// ## Grammar limits
///
/// The encoding is quote-free and unescaped, so not every mapping survives
/// a round-trip. A document is *expressible* when:
///
/// - keys contain no `:` or `,`, no leading `#`, and no leading whitespace;
/// - scalars contain no `,`, and no line has leading or trailing whitespace;
/// - list items are non-empty and free of `,` and newlines;
/// - lists have at least two items (a one-item list reads back as a scalar).
///
/// Callers holding payloads outside these limits must flatten them first;
/// the codec will not silently mangle and re-quote.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    entries: BTreeMap<String, Value>,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let _ = self.entries.insert(key.into(), value.into());
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Look up a scalar by key; `None` if absent or a list.
    #[must_use]
    pub fn get_scalar(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_scalar)
    }

    /// Look up a list by key; `None` if absent or a scalar.
    #[must_use]
    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).and_then(Value::as_list)
    }

    /// Remove a key, returning its value if present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Whether the document contains `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Iterate keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the document has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
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
    fn empty_document() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.len(), 0);
        assert!(doc.get("missing").is_none());
    }

    #[test]
    fn insert_and_get_scalar() {
        let mut doc = Document::new();
        doc.insert("goal", "build CLI");
        assert_eq!(doc.get_scalar("goal"), Some("build CLI"));
        assert!(doc.get_list("goal").is_none());
    }

    #[test]
    fn insert_and_get_list() {
        let mut doc = Document::new();
        doc.insert("decisions", vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(doc.get_list("decisions"), Some(&["a".to_owned(), "b".to_owned()][..]));
        assert!(doc.get_scalar("decisions").is_none());
    }

    #[test]
    fn insert_replaces() {
        let mut doc = Document::new();
        doc.insert("k", "first");
        doc.insert("k", "second");
        assert_eq!(doc.get_scalar("k"), Some("second"));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn keys_iterate_sorted() {
        let mut doc = Document::new();
        doc.insert("zebra", "z");
        doc.insert("alpha", "a");
        doc.insert("mid", "m");
        let keys: Vec<&String> = doc.keys().collect();
        assert_eq!(keys, vec!["alpha", "mid", "zebra"]);
    }

    #[test]
    fn remove_returns_value() {
        let mut doc = Document::new();
        doc.insert("k", "v");
        assert_eq!(doc.remove("k"), Some(Value::Scalar("v".to_owned())));
        assert!(doc.remove("k").is_none());
    }
}
