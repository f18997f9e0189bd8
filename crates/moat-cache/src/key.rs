//! Cache key derivation.

use sha2::{Digest, Sha256};

/// Derive the content-addressable key for a remote model request.
///
/// The key is a hex-encoded SHA-256 over the length-prefixed
/// concatenation of the model name, the deterministically encoded prompt,
/// and the canonical parameter string. Length prefixes keep field
/// boundaries unambiguous, and because the prompt encoding is itself a
/// pure function of its content, equal requests produce equal keys across
/// process runs.
#[must_use]
pub fn cache_key(model: &str, encoded_prompt: &str, params: &str) -> String {
    let mut hasher = Sha256::new();
    for part in [model, encoded_prompt, params] {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
