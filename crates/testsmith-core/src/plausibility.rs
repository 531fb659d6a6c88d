// ABOUTME: Cheap input plausibility filter that rejects obvious noise before any model call.
// ABOUTME: Thresholds are tunable policy values, not protocol; precision is not a goal.

/// Domain keywords that mark an input as testing-related.
pub const DEFAULT_KEYWORDS: [&str; 20] = [
    "test", "login", "page", "user", "password", "click", "button", "input", "field", "verify",
    "check", "validate", "scenario", "feature", "given", "when", "then", "selenium", "script",
    "generate",
];

/// Rules deciding whether a request text is worth sending to a model.
#[derive(Debug, Clone, PartialEq)]
pub struct PlausibilityPolicy {
    /// Inputs shorter than this (after trimming) are rejected.
    pub min_chars: usize,
    /// The meaningful-word ratio only applies from this many words up.
    pub ratio_min_words: usize,
    /// Minimum share of words that are alphabetic and at least three letters long.
    pub min_meaningful_ratio: f64,
    /// Without a keyword, the input needs more than this many non-whitespace characters.
    pub fallback_min_chars: usize,
    pub keywords: Vec<String>,
}

impl Default for PlausibilityPolicy {
    fn default() -> Self {
        Self {
            min_chars: 5,
            ratio_min_words: 3,
            min_meaningful_ratio: 0.3,
            fallback_min_chars: 15,
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl PlausibilityPolicy {
    /// True when `text` plausibly describes something to test.
    pub fn accepts(&self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.chars().count() < self.min_chars {
            return false;
        }

        let words: Vec<&str> = trimmed.split_whitespace().collect();
        if words.len() >= self.ratio_min_words {
            let meaningful = words.iter().filter(|w| is_meaningful(w)).count();
            if (meaningful as f64) / (words.len() as f64) < self.min_meaningful_ratio {
                return false;
            }
        }

        let lowered = trimmed.to_lowercase();
        if self.keywords.iter().any(|k| lowered.contains(k.as_str())) {
            return true;
        }

        let substance = trimmed.chars().filter(|c| !c.is_whitespace()).count();
        substance > self.fallback_min_chars
    }
}

fn is_meaningful(word: &str) -> bool {
    word.len() >= 3 && word.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_noise() {
        let policy = PlausibilityPolicy::default();
        assert!(!policy.accepts("asdkj qwlekj zpx"));
        assert!(!policy.accepts("hi"));
        assert!(!policy.accepts("    abc   "));
    }

    #[test]
    fn rejects_symbol_soup() {
        let policy = PlausibilityPolicy::default();
        assert!(!policy.accepts("$$ ## 12 !! ?? test"));
    }

    #[test]
    fn accepts_keyword_inputs() {
        let policy = PlausibilityPolicy::default();
        assert!(policy.accepts("Login page"));
        assert!(policy.accepts("VERIFY the cart"));
        assert!(policy.accepts("As a user I want to reset my password"));
    }

    #[test]
    fn accepts_long_inputs_without_keywords() {
        let policy = PlausibilityPolicy::default();
        assert!(policy.accepts("Customers can export monthly invoices as PDF"));
    }

    #[test]
    fn thresholds_are_tunable() {
        let policy = PlausibilityPolicy {
            fallback_min_chars: 100,
            keywords: vec!["invoice".to_string()],
            ..PlausibilityPolicy::default()
        };
        assert!(!policy.accepts("Customers can export monthly reports as PDF"));
        assert!(policy.accepts("Customers can export an invoice"));
    }
}
