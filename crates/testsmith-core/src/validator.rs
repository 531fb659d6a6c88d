// ABOUTME: Heuristic truncation detection for model output.
// ABOUTME: Combines a size signal (near the output budget) with a grammar-specific shape signal.

use crate::tokens::TokenCounter;

/// Fraction of the output budget at which a response counts as "at the limit".
pub const NEAR_LIMIT_RATIO: f64 = 0.95;

const TERMINAL_PUNCTUATION: [char; 5] = ['.', '!', '?', ':', ';'];

/// The target grammar of an artifact, which decides what a complete ending looks like.
///
/// For anything other than Gherkin the shape signal is only "ends in
/// punctuation", which is a weak hint for code and chat replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    Gherkin,
    Script,
    Prose,
}

/// Estimates whether model output was cut off at its token budget.
///
/// Both false positives and false negatives are expected; results feed
/// diagnostics only.
#[derive(Debug, Clone)]
pub struct OutputValidator {
    counter: TokenCounter,
    grammar: Grammar,
}

impl OutputValidator {
    pub fn new(counter: TokenCounter, grammar: Grammar) -> Self {
        Self { counter, grammar }
    }

    pub fn counter(&self) -> &TokenCounter {
        &self.counter
    }

    pub fn grammar(&self) -> Grammar {
        self.grammar
    }

    /// Size signal: the text uses at least 95% of `max_output_tokens`.
    pub fn near_budget(&self, text: &str, max_output_tokens: u32) -> bool {
        let tokens = self.counter.count(text) as f64;
        tokens >= f64::from(max_output_tokens) * NEAR_LIMIT_RATIO
    }

    /// Truncated when the text is near its budget and also looks unfinished.
    pub fn is_truncated(&self, text: &str, max_output_tokens: u32) -> bool {
        self.near_budget(text, max_output_tokens) && looks_unfinished(text, self.grammar)
    }
}

/// Shape signal: an abrupt ending, or for Gherkin a trailing scenario without a `Then` step.
pub fn looks_unfinished(text: &str, grammar: Grammar) -> bool {
    let trimmed = text.trim_end();
    let abrupt_ending = !trimmed.is_empty() && !trimmed.ends_with(TERMINAL_PUNCTUATION);

    let open_scenario = grammar == Grammar::Gherkin
        && text
            .rsplit_once("Scenario:")
            .is_some_and(|(_, last_scenario)| !last_scenario.contains("Then "));

    abrupt_ending || open_scenario
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator(grammar: Grammar) -> OutputValidator {
        OutputValidator::new(TokenCounter::cl100k().unwrap(), grammar)
    }

    #[test]
    fn unpunctuated_output_at_zero_budget_is_truncated() {
        let v = validator(Grammar::Gherkin);
        assert!(v.is_truncated("Given the user opens the", 0));
    }

    #[test]
    fn output_filling_the_budget_without_ending_is_truncated() {
        let v = validator(Grammar::Prose);
        let text = "the model kept writing and writing ".repeat(40);
        let text = text.trim_end();
        let budget = v.counter().count(text) as u32;
        assert!(v.is_truncated(text, budget));
    }

    #[test]
    fn short_punctuated_output_is_never_truncated() {
        for grammar in [Grammar::Gherkin, Grammar::Script, Grammar::Prose] {
            let v = validator(grammar);
            assert!(!v.is_truncated("All scenarios are complete.", 1024));
            assert!(!v.is_truncated("All scenarios are complete.", 0));
        }
    }

    #[test]
    fn short_unpunctuated_output_well_under_budget_is_not_truncated() {
        let v = validator(Grammar::Script);
        assert!(!v.is_truncated("def test_login()", 1024));
    }

    #[test]
    fn gherkin_scenario_without_then_looks_unfinished() {
        let text = "Scenario: Login\n  Given a user\n  When they submit.";
        assert!(looks_unfinished(text, Grammar::Gherkin));
        assert!(!looks_unfinished(text, Grammar::Prose));

        let complete = "Scenario: Login\n  Given a user\n  Then they see the dashboard.";
        assert!(!looks_unfinished(complete, Grammar::Gherkin));
    }

    #[test]
    fn only_the_last_scenario_matters() {
        let text = "Scenario: A\n  Then ok.\nScenario: B\n  Given x.";
        assert!(looks_unfinished(text, Grammar::Gherkin));
    }

    #[test]
    fn empty_text_is_not_abrupt() {
        assert!(!looks_unfinished("", Grammar::Prose));
        assert!(!looks_unfinished("   \n", Grammar::Gherkin));
    }
}
