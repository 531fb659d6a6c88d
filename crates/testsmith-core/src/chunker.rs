// ABOUTME: Splits oversized requirement documents into ordered, bounded-size chunks.
// ABOUTME: Prefers structural boundaries (headings, numbered items, labels, bold, blank lines) over raw windows.

use std::sync::LazyLock;

use regex::Regex;

/// Default maximum chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 4000;

/// Structural delimiters in priority order. The first one that matches anywhere
/// in the document decides how it is split.
static SECTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Markdown headings: "# Header", "## Subheader"
        r"(?m)^#+[ \t]+[\w \t]+",
        // Numbered sections: "1. Section"
        r"(?m)^\d+\.[ \t]+[\w \t]+",
        // Title-cased label lines: "Requirements:"
        r"(?m)^[A-Z][\w \t]*:",
        // Bold runs: "**Section**"
        r"\*\*[\w\s]+\*\*",
        // Paragraph breaks
        r"\n\n",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("section pattern is a valid regex"))
    .collect()
});

/// Split `text` into chunks of at most `max_size` characters.
///
/// Concatenating the returned chunks reproduces `text` exactly. Delimiter text
/// stays attached to the segment it introduces, so a heading always opens the
/// chunk that carries its section. A `max_size` of zero is treated as one.
pub fn chunk_by_sections(text: &str, max_size: usize) -> Vec<String> {
    let max_size = max_size.max(1);
    if char_len(text) <= max_size {
        return vec![text.to_string()];
    }

    for pattern in SECTION_PATTERNS.iter() {
        if !pattern.is_match(text) {
            continue;
        }
        let chunks = pack_segments(split_before_matches(text, pattern), max_size);
        if !chunks.is_empty() {
            tracing::debug!(
                pattern = pattern.as_str(),
                chunks = chunks.len(),
                "split input by section pattern"
            );
            return chunks;
        }
    }

    tracing::debug!("no section pattern matched; using fixed windows");
    window_slices(text, max_size)
}

/// Cut `text` at the start of every match, dropping empty pieces.
fn split_before_matches<'a>(text: &'a str, pattern: &Regex) -> Vec<&'a str> {
    let mut segments = Vec::new();
    let mut start = 0;
    for m in pattern.find_iter(text) {
        if m.start() > start {
            segments.push(&text[start..m.start()]);
            start = m.start();
        }
    }
    if start < text.len() {
        segments.push(&text[start..]);
    }
    segments
}

/// Greedily pack consecutive segments into chunks no longer than `max_size`.
fn pack_segments(segments: Vec<&str>, max_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for segment in segments {
        let segment_len = char_len(segment);

        if segment_len > max_size {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            chunks.extend(window_slices(segment, max_size));
            continue;
        }

        if current_len + segment_len > max_size && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(segment);
        current_len += segment_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Slice `text` into consecutive windows of `max_size` characters.
fn window_slices(text: &str, max_size: usize) -> Vec<String> {
    let mut windows = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == max_size {
            windows.push(text[start..idx].to_string());
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        windows.push(text[start..].to_string());
    }
    windows
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_lossless(text: &str, max_size: usize) -> Vec<String> {
        let chunks = chunk_by_sections(text, max_size);
        assert_eq!(chunks.concat(), text, "chunks must reassemble the input");
        for chunk in &chunks {
            assert!(
                chunk.chars().count() <= max_size.max(1),
                "chunk of {} chars exceeds {}",
                chunk.chars().count(),
                max_size
            );
            assert!(!chunk.is_empty(), "no empty chunks");
        }
        chunks
    }

    #[test]
    fn short_input_is_a_single_identical_chunk() {
        for text in ["", "login", "Feature: Login\n\nScenario: ok"] {
            assert_eq!(chunk_by_sections(text, 4000), vec![text.to_string()]);
        }
        let exact = "x".repeat(50);
        assert_eq!(chunk_by_sections(&exact, 50), vec![exact.clone()]);
    }

    #[test]
    fn markdown_headings_open_their_chunks() {
        let section = |n: usize| format!("# Story {n}\nAs a user I want feature {n} to work well.\n");
        let text: String = (1..=6).map(section).collect();

        let chunks = assert_lossless(&text, 120);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.starts_with("# Story"), "chunk should start at a heading: {chunk:?}");
        }
    }

    #[test]
    fn numbered_sections_are_used_when_no_headings() {
        let text: String = (1..=8)
            .map(|n| format!("{n}. Requirement number {n} must be validated on submit\n"))
            .collect();

        let chunks = assert_lossless(&text, 130);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().next().unwrap().is_ascii_digit()));
    }

    #[test]
    fn oversized_section_is_windowed() {
        let text = format!("# Intro\nshort\n# Huge\n{}\n# Tail\nend\n", "a".repeat(250));
        let chunks = assert_lossless(&text, 100);
        assert!(chunks.len() >= 4);
    }

    #[test]
    fn blank_line_fallback() {
        let paragraph = "the quick brown fox jumps over the lazy dog";
        let text = vec![paragraph; 10].join("\n\n");
        let chunks = assert_lossless(&text, 100);
        assert!(chunks.len() > 1);
    }

    #[test]
    fn no_delimiter_uses_fixed_windows() {
        let text = "abcdefghij".repeat(25);
        let chunks = assert_lossless(&text, 60);
        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[0].len(), 60);
        assert_eq!(chunks[4].len(), 10);
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "café☕テスト".repeat(30);
        let chunks = assert_lossless(&text, 7);
        assert!(chunks.len() > 1);
    }

    #[test]
    fn zero_max_size_is_treated_as_one() {
        let chunks = assert_lossless("abc", 0);
        assert_eq!(chunks, vec!["a", "b", "c"]);
    }
}
