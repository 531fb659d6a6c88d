// ABOUTME: Strips wrapper artifacts (code fences, reasoning tags) from raw model output.
// ABOUTME: Also isolates the payload after a grammar anchor and extracts fenced code blocks.

use std::sync::LazyLock;

use regex::Regex;

/// First keyword of a Gherkin document.
pub const FEATURE_ANCHOR: &str = "Feature:";

/// Opening fence with an optional language tag (```` ``` ````, ```` ```gherkin ````).
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z0-9_+\-]*").expect("fence regex is valid"));

/// Reasoning markers some models wrap their chain of thought in.
const REASONING_MARKERS: [&str; 4] = ["<think>", "</think>", "<div class=\"think\">", "</div>"];

/// Clean raw model output.
///
/// Removes code fences and reasoning markers, then, when `anchor` occurs,
/// drops everything before its first occurrence. The result is trimmed.
/// Cleaning is idempotent: `clean(clean(x)) == clean(x)`.
pub fn clean(raw: &str, anchor: Option<&str>) -> String {
    let mut current = clean_once(raw, anchor);
    loop {
        let next = clean_once(&current, anchor);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Clean Gherkin output, anchoring on `Feature:`.
pub fn clean_gherkin(raw: &str) -> String {
    clean(raw, Some(FEATURE_ANCHOR))
}

fn clean_once(text: &str, anchor: Option<&str>) -> String {
    let text = strip_fences(text);
    let text = strip_reasoning(&text);
    let text = match anchor.and_then(|a| text.find(a)) {
        Some(idx) => &text[idx..],
        None => text.as_str(),
    };
    text.trim().to_string()
}

/// Remove reasoning markers, leaving whatever they wrapped in place.
pub fn strip_reasoning(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = REASONING_MARKERS
            .iter()
            .fold(current.clone(), |acc, marker| acc.replace(marker, ""));
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Remove every code fence marker, keeping the fenced content.
pub fn strip_fences(text: &str) -> String {
    FENCE_RE.replace_all(text, "").into_owned()
}

/// Body of the first fenced block tagged with `language`, trimmed.
pub fn extract_code_block(text: &str, language: &str) -> Option<String> {
    let pattern = format!(r"(?s)```{}[ \t]*\r?\n(.+?)```", regex::escape(language));
    let re = Regex::new(&pattern).ok()?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|body| body.as_str().trim().to_string())
}
