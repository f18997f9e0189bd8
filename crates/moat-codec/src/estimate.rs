//! Cheap token-count estimation.
//!
//! Sizing a payload with the remote tokenizer would cost the very network
//! round-trip the estimate exists to avoid, so compaction budgeting uses a
//! local character-count heuristic instead. Mis-estimation affects cost
//! efficiency only, never correctness.

/// Characters per token assumed by [`estimate_tokens`].
pub const DEFAULT_CHARS_PER_TOKEN: u32 = 4;

/// Estimate the model token count of a piece of flat text.
///
/// Heuristic: whitespace-separated word count plus one token per four
/// bytes. Tracks real tokenizers closely enough for threshold checks.
#[must_use]
pub fn estimate_tokens(text: &str) -> u32 {
    estimate_tokens_with(text, DEFAULT_CHARS_PER_TOKEN)
}

/// [`estimate_tokens`] with a tunable characters-per-token divisor.
///
/// A divisor of zero is treated as the default.
#[must_use]
pub fn estimate_tokens_with(text: &str, chars_per_token: u32) -> u32 {
    let divisor = if chars_per_token == 0 {
        DEFAULT_CHARS_PER_TOKEN
    } else {
        chars_per_token
    };
    let words = text.split_whitespace().count();
    let fraction = text.len() / divisor as usize;
    u32::try_from(words + fraction).unwrap_or(u32::MAX)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_zero() {
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn counts_words_and_quarter_length() {
        // 2 words + 11 bytes / 4 = 2 + 2
        assert_eq!(estimate_tokens("hello world"), 4);
    }

    #[test]
    fn whitespace_only() {
        // 0 words + 4/4
        assert_eq!(estimate_tokens("    "), 1);
    }

    #[test]
    fn scales_with_content() {
        let short = estimate_tokens("a few words");
        let long = estimate_tokens(&"a few words ".repeat(50));
        assert!(long > short * 10);
    }

    #[test]
    fn larger_divisor_estimates_fewer_tokens() {
        let text = "some reasonably sized body of text for sizing";
        assert!(estimate_tokens_with(text, 8) < estimate_tokens_with(text, 2));
    }

    #[test]
    fn zero_divisor_falls_back_to_default() {
        let text = "hello world";
        assert_eq!(estimate_tokens_with(text, 0), estimate_tokens(text));
    }
}
