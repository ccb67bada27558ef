//! Word-bounded chunking of normalized transcripts

/// Rough characters-per-token ratio used to size chunks against a model's
/// context window.
pub const CHARS_PER_TOKEN: usize = 4;

/// Split `text` on whitespace and regroup the words into chunks of at most
/// `size` words, each rejoined with single spaces.
///
/// Every chunk but the last holds exactly `size` words. Empty (or
/// whitespace-only) input yields no chunks. A `size` of zero is treated as one.
pub fn chunk_words(text: &str, size: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();

    words
        .chunks(size.max(1))
        .map(|group| group.join(" "))
        .collect()
}

/// Approximate token count of `text`.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}
