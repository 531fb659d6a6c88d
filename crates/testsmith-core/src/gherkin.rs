// ABOUTME: Normalizes Gherkin feature text into a fixed indentation scheme by keyword class.
// ABOUTME: Also provides the minimal two-scenario skeleton used when generation fails.

const STEP_KEYWORDS: [&str; 5] = ["Given", "When", "Then", "And", "But"];
const NARRATIVE_PREFIXES: [&str; 3] = ["As a", "I want", "So that"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Feature,
    Background,
    Scenario,
}

/// Re-indent a feature file line by line.
///
/// | line class                         | indent |
/// |------------------------------------|--------|
/// | `Feature:` and its narrative       | 0      |
/// | tags, `Background:`, `Scenario:`   | 2      |
/// | steps, `Examples:`                 | 4      |
/// | table rows                         | 6      |
/// | any other line outside the feature | 4      |
///
/// Tags, backgrounds and scenarios are preceded by a blank line, except a
/// scenario directly under its tags. Formatting is idempotent.
pub fn format_feature(content: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut section = Section::None;

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() {
            out.push(String::new());
            continue;
        }

        if line.starts_with("Feature:") {
            out.push(line.to_string());
            section = Section::Feature;
        } else if NARRATIVE_PREFIXES.iter().any(|p| line.starts_with(p)) {
            out.push(line.to_string());
        } else if line.starts_with("Scenario:") || line.starts_with("Scenario Outline:") {
            let under_tag = out.last().is_some_and(|prev| prev.trim_start().starts_with('@'));
            if !under_tag {
                push_separator(&mut out);
            }
            out.push(format!("  {line}"));
            section = Section::Scenario;
        } else if STEP_KEYWORDS.iter().any(|k| line.starts_with(k)) {
            out.push(format!("    {line}"));
        } else if line.starts_with('|') {
            out.push(format!("      {line}"));
        } else if line.starts_with("Examples:") {
            out.push(format!("    {line}"));
        } else if line.starts_with('@') {
            let under_tag = out.last().is_some_and(|prev| prev.trim_start().starts_with('@'));
            if !under_tag {
                push_separator(&mut out);
            }
            out.push(format!("  {line}"));
        } else if line.starts_with("Background:") {
            push_separator(&mut out);
            out.push(format!("  {line}"));
            section = Section::Background;
        } else if section == Section::Feature {
            out.push(line.to_string());
        } else {
            out.push(format!("    {line}"));
        }
    }

    out.join("\n")
}

fn push_separator(out: &mut Vec<String>) {
    if out.last().is_some_and(|prev| !prev.is_empty()) {
        out.push(String::new());
    }
}

/// A syntactically valid two-scenario feature used when the model pipeline fails.
pub fn fallback_feature(title: &str) -> String {
    format!(
        "Feature: {title}\n\
         \n  Scenario: Basic functionality\n\
         \x20   Given the system is ready\n\
         \x20   When the user performs the requested action\n\
         \x20   Then the expected result should occur\n\
         \n  Scenario: Error handling\n\
         \x20   Given the system is ready\n\
         \x20   When invalid input is provided\n\
         \x20   Then an appropriate error message should be displayed"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSY: &str = "Feature: Login\nAs a user\nI want to log in\nSo that I can work\nUsers must exist first\nBackground:\nGiven the app is running\n@happy_path\nScenario: Valid login\nGiven I am on the login page\nWhen I submit valid credentials\nThen I see the dashboard\nScenario Outline: Bad input\nWhen I enter <user>\nThen I see <error>\nExamples:\n| user | error |\n| a | too short |";

    #[test]
    fn applies_indentation_scheme() {
        let expected = "Feature: Login\n\
As a user\n\
I want to log in\n\
So that I can work\n\
Users must exist first\n\
\n  Background:\n\
\x20   Given the app is running\n\
\n  @happy_path\n\
\x20 Scenario: Valid login\n\
\x20   Given I am on the login page\n\
\x20   When I submit valid credentials\n\
\x20   Then I see the dashboard\n\
\n  Scenario Outline: Bad input\n\
\x20   When I enter <user>\n\
\x20   Then I see <error>\n\
\x20   Examples:\n\
\x20     | user | error |\n\
\x20     | a | too short |";
        assert_eq!(format_feature(MESSY), expected);
    }

    #[test]
    fn formatting_is_idempotent() {
        let once = format_feature(MESSY);
        assert_eq!(format_feature(&once), once);
    }

    #[test]
    fn free_text_inside_scenarios_is_indented() {
        let formatted = format_feature("Scenario: A\nGiven x\nsome note");
        assert!(formatted.ends_with("\n    some note"));
    }

    #[test]
    fn fallback_has_two_complete_scenarios() {
        let skeleton = fallback_feature("login");
        assert!(skeleton.starts_with("Feature: login\n"));
        assert_eq!(skeleton.matches("Scenario:").count(), 2);
        assert_eq!(skeleton.matches("Then ").count(), 2);
        assert_eq!(format_feature(&skeleton), skeleton, "skeleton is already formatted");
    }
}
