//! Text statistics shared by input validation and the stats endpoint.

use serde::Serialize;

const WORDS_PER_MINUTE: usize = 200;

/// Whitespace-separated tokens, empty tokens discarded.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Raw character count (Unicode scalar values, not bytes). No trimming.
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStats {
    pub characters: usize,
    pub words: usize,
    pub sentences: usize,
    pub reading_minutes: usize,
}

pub fn text_stats(text: &str) -> TextStats {
    if text.trim().is_empty() {
        return TextStats {
            characters: 0,
            words: 0,
            sentences: 0,
            reading_minutes: 0,
        };
    }

    let words = word_count(text);
    TextStats {
        characters: char_count(text),
        words,
        sentences: text
            .split(['.', '!', '?'])
            .filter(|s| !s.is_empty())
            .count(),
        reading_minutes: words.div_ceil(WORDS_PER_MINUTE),
    }
}
