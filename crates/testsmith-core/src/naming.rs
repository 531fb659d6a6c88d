// ABOUTME: File-name derivation for persisted artifacts.
// ABOUTME: Applies extensions, time-derived defaults, and reduces user input to a safe single path component.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;

static ALPHA_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z]{3,}\b").expect("word regex is valid"));
static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\-]").expect("unsafe char regex is valid"));

const MAX_DERIVED_NAME: usize = 50;

/// Reduce a user-supplied name to its last path component with no leading dots.
pub fn sanitize_name(raw: &str) -> Option<String> {
    let last = raw.trim().rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = last.trim_start_matches('.').trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// `<name>.feature`, defaulting to `feature_<unix seconds>.feature`.
pub fn feature_file_name(requested: Option<&str>) -> String {
    with_extension(requested, "feature", ".feature")
}

/// `<name>.py`, defaulting to `test_<unix seconds>.py`.
pub fn script_file_name(requested: Option<&str>) -> String {
    with_extension(requested, "test", ".py")
}

fn with_extension(requested: Option<&str>, default_prefix: &str, extension: &str) -> String {
    let base = requested
        .and_then(sanitize_name)
        .unwrap_or_else(|| format!("{}_{}", default_prefix, Utc::now().timestamp()));
    if base.ends_with(extension) {
        base
    } else {
        format!("{base}{extension}")
    }
}

/// Short identifier built from the first three alphabetic words (3+ letters) of a text.
pub fn derive_short_name(text: &str) -> String {
    let words: Vec<String> = ALPHA_WORD
        .find_iter(text)
        .take(3)
        .map(|m| m.as_str().to_lowercase())
        .collect();

    let name = if words.is_empty() {
        "test_cases".to_string()
    } else {
        words.join("_")
    };
    let name = UNSAFE_CHARS.replace_all(&name, "_");
    name.chars().take(MAX_DERIVED_NAME).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_added_once() {
        assert_eq!(feature_file_name(Some("login")), "login.feature");
        assert_eq!(feature_file_name(Some("login.feature")), "login.feature");
        assert_eq!(script_file_name(Some(" checkout ")), "checkout.py");
    }

    #[test]
    fn defaults_are_time_derived() {
        let name = feature_file_name(None);
        assert!(name.starts_with("feature_") && name.ends_with(".feature"));
        let name = script_file_name(Some("   "));
        assert!(name.starts_with("test_") && name.ends_with(".py"));
    }

    #[test]
    fn path_components_are_stripped() {
        assert_eq!(feature_file_name(Some("../../etc/passwd")), "passwd.feature");
        assert_eq!(sanitize_name("..\\secret"), Some("secret".to_string()));
        assert_eq!(sanitize_name("dir/"), None);
        assert_eq!(sanitize_name(".hidden"), Some("hidden".to_string()));
    }

    #[test]
    fn short_name_uses_first_meaningful_words() {
        assert_eq!(
            derive_short_name("Test Plan: As a user I want to log in"),
            "test_plan_user"
        );
        assert_eq!(derive_short_name("1 2 3 ok"), "test_cases");
        assert!(derive_short_name(&"abcdefghijklmnopqrstuvwxyz ".repeat(5)).len() <= 50);
    }
}
