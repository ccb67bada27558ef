//! Transcript cleaning: subtitle metadata, noise markers and speaker labels

use regex::Regex;
use std::sync::OnceLock;

fn timing_line_regex() -> &'static Regex {
    static TIMING_LINE: OnceLock<Regex> = OnceLock::new();
    TIMING_LINE.get_or_init(|| {
        Regex::new(r"^\d{2}:\d{2}:\d{2}[.,]\d{3}\s*-->").expect("Failed to compile timing line regex")
    })
}

fn inline_timing_regex() -> &'static Regex {
    static INLINE_TIMING: OnceLock<Regex> = OnceLock::new();
    INLINE_TIMING.get_or_init(|| {
        Regex::new(r"\d{2}:\d{2}:\d{2}[.,]\d{3}\s*-->(?:\s*\d{2}:\d{2}:\d{2}[.,]\d{3})?")
            .expect("Failed to compile inline timing regex")
    })
}

/// Hesitation markers and filler phrases. The question-tag fillers end in `?`,
/// so they cannot take a trailing word boundary.
fn filler_regex() -> &'static Regex {
    static FILLERS: OnceLock<Regex> = OnceLock::new();
    FILLERS.get_or_init(|| {
        Regex::new(r"(?i)\b(?:hmm+|ahn+|uh+|éé+|tipo assim)\b|\b(?:sabe|entende|certo)\?")
            .expect("Failed to compile filler regex")
    })
}

/// `[inaudible]`, `[laughter]`, `[pause]` and any other bracketed annotation.
fn annotation_regex() -> &'static Regex {
    static ANNOTATIONS: OnceLock<Regex> = OnceLock::new();
    ANNOTATIONS
        .get_or_init(|| Regex::new(r"\[[^\]\n]*\]").expect("Failed to compile annotation regex"))
}

fn speaker_regex() -> &'static Regex {
    static SPEAKER: OnceLock<Regex> = OnceLock::new();
    SPEAKER.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*[A-ZÁ-Ú][a-zá-ú]+:[ \t]*").expect("Failed to compile speaker regex")
    })
}

fn whitespace_regex() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"))
}

fn line_break_regex() -> &'static Regex {
    static LINE_BREAK: OnceLock<Regex> = OnceLock::new();
    LINE_BREAK.get_or_init(|| Regex::new(r"\s*\n\s*").expect("Failed to compile line break regex"))
}

/// Clean a raw transcript into a single line of prose.
///
/// Steps, in order:
/// 1. drop timing lines, bare cue numbers and a leading `WEBVTT` declaration
/// 2. erase fillers and bracketed annotations (case-insensitive)
/// 3. strip leading `Name:` speaker labels
/// 4. collapse whitespace, erase inline timing ranges, trim and capitalize
///    the first character
///
/// Timing ranges are erased only once the text is a single line, since the
/// earlier removals can join a timestamp with a `-->` from the next line.
/// A result made of digits alone is a leftover cue number and is dropped.
///
/// Never fails; input without any of these markers passes through with only
/// whitespace and capitalization touched.
pub fn normalize(raw: &str) -> String {
    let text = filter_lines(raw);
    let text = remove_noise(&text);
    let text = speaker_regex().replace_all(&text, "");
    let text = whitespace_regex().replace_all(&text, " ");
    let text = strip_inline_timings(&text);
    let text = text.trim();

    if text.bytes().all(|b| b.is_ascii_digit()) {
        return String::new();
    }
    capitalize_first(text)
}

/// Merge any remaining multi-line fragments into one continuous line.
pub fn consolidate_fragments(text: &str) -> String {
    line_break_regex().replace_all(text, " ").into_owned()
}

/// Full preprocessing front half: [`normalize`] followed by [`consolidate_fragments`].
pub fn prepare(raw: &str) -> String {
    consolidate_fragments(&normalize(raw))
}

fn filter_lines(raw: &str) -> String {
    let mut kept = Vec::new();

    for (i, line) in raw.lines().enumerate() {
        let trimmed = line.trim().trim_start_matches('\u{FEFF}');

        if i == 0 && trimmed.to_lowercase().starts_with("webvtt") {
            continue;
        }
        if timing_line_regex().is_match(trimmed) {
            continue;
        }
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }

        kept.push(line);
    }

    kept.join("\n")
}

fn remove_noise(text: &str) -> String {
    let text = filler_regex().replace_all(text, "");
    annotation_regex().replace_all(&text, "").into_owned()
}

fn strip_inline_timings(text: &str) -> String {
    let mut text = text.to_string();

    // Erasing one range can splice digits into a new one.
    while inline_timing_regex().is_match(&text) {
        text = inline_timing_regex().replace_all(&text, "").into_owned();
    }

    whitespace_regex().replace_all(&text, " ").into_owned()
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
