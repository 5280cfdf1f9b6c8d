//! Text normalization
//!
//! Shared final stage of every extraction strategy: collapse whitespace and
//! enforce the word budget so the payload handed to the caller is bounded and
//! stable regardless of the input page's size.
//!
//! Normalization is deterministic and idempotent - applying it to already
//! normalized text is a no-op. The bound is a hard cap, not a target; shorter
//! input passes through unchanged apart from whitespace collapsing.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_MAX_WORDS;

/// Word-bounded, whitespace-normalized page text
///
/// Invariants: at most the configured number of space-separated tokens,
/// single-spaced, no control characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    /// The normalized text content
    pub text: String,
}

impl ExtractedText {
    /// Number of space-separated tokens
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Whitespace collapsing and word-count truncation
#[derive(Debug, Clone)]
pub struct Normalizer {
    /// Maximum number of whitespace-separated tokens to keep
    pub max_words: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            max_words: DEFAULT_MAX_WORDS,
        }
    }
}

impl Normalizer {
    /// Create a normalizer with an explicit word budget
    pub fn new(max_words: usize) -> Self {
        Self { max_words }
    }

    /// Collapse whitespace runs, strip control characters, and truncate to
    /// the first `max_words` tokens, rejoined with single spaces
    pub fn normalize(&self, text: &str) -> ExtractedText {
        let text = text
            .split_whitespace()
            .map(|token| token.chars().filter(|c| !c.is_control()).collect::<String>())
            .filter(|token| !token.is_empty())
            .take(self.max_words)
            .collect::<Vec<_>>()
            .join(" ");

        ExtractedText { text }
    }
}
