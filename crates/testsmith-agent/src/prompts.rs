// ABOUTME: System instructions and per-call prompt builders for every generator.
// ABOUTME: Shared here so stage prompts stay consistent and testable without a model.

/// Standing instructions for Gherkin feature generation.
pub const FEATURE_INSTRUCTIONS: &str = "You are a BDD test expert specializing in automated testing. \
Generate comprehensive Gherkin feature files for any type of project.

Rules:
1. Use Feature, Background (if needed) and Scenario structure.
2. Every scenario has clear, automatable Given, When and Then steps.
3. Cover core workflows, data validation, error handling, integrations, \
UI interactions and performance where relevant.
4. Keep steps atomic and reusable, use consistent terminology and parameterize test data.
5. Include happy paths, boundary conditions, error conditions, data variations, \
state transitions and concurrent operations.

Multiple user stories: cover EVERY story in the input with at least one complete scenario.

Partial inputs: when the input is marked as a chunk of a larger document \
(e.g. \"CHUNK 2 OF 5\"), generate only the scenarios relevant to that chunk.

Output:
1. Start with a Feature: line and a clear feature name.
2. Add the user story in As a / I want to / So that form when possible.
3. Tag scenarios (@happy_path, @error_case, ...).
4. Never stop in the middle of a scenario.";

/// Standing instructions for the guided browser-script prompt.
pub const SCRIPT_GUIDED_INSTRUCTIONS: &str = "Generate a complete Selenium test script based on Gherkin scenarios. \
Follow these guidelines:
1. Include proper imports (selenium webdriver, pytest, etc.)
2. Use explicit waits with WebDriverWait
3. Include proper By selectors and assertions
4. Handle driver setup and cleanup
5. Add proper error handling
6. Follow Selenium best practices";

/// Standing instructions for the plain browser-script prompt.
pub const SCRIPT_PLAIN_INSTRUCTIONS: &str = "You are a QA automation expert. Generate Selenium test scripts.
Rules:
1. Use Python with Selenium WebDriver
2. Include proper waits and error handling
3. Follow Page Object Model when appropriate
4. Add clear comments and docstrings
5. Handle edge cases and errors";

/// Standing instructions for manual test case generation.
pub const TESTCASE_INSTRUCTIONS: &str = "You are a QA expert specializing in manual test case creation. \
Generate comprehensive manual test cases from user stories.
Rules:
1. Create detailed test cases with clear steps
2. Include positive, negative, and edge cases
3. Generate multiple test data variations
4. Format output as specified
5. Output ONLY the test cases, nothing else";

/// Import preamble the guided script style guarantees.
pub const SELENIUM_PREAMBLE: &str = "from selenium import webdriver
from selenium.webdriver.common.by import By
from selenium.webdriver.support.ui import WebDriverWait
from selenium.webdriver.support import expected_conditions as EC
import pytest

";

const SCENARIO_EXAMPLE: &str = "Example format:
  @tag
  Scenario: Name
    Given ...
    When ...
    Then ...";

pub fn feature_header(requirement: &str) -> String {
    format!(
        "Generate ONLY the Feature header and description for: {requirement}
Include the Feature name, the user story (As a, I want to, So that), and a Background if needed.
Do NOT include any scenarios yet.
Example format:
Feature: Name
  As a ...
  I want to ...
  So that ...

  Background:
    Given ..."
    )
}

pub fn feature_scenarios(requirement: &str) -> String {
    format!(
        "Generate 3-4 essential Gherkin scenarios for: {requirement}
Do NOT include the Feature header or description.
Start directly with @tags and Scenario: for each scenario.
Focus on the most important core functionality and happy paths.
{SCENARIO_EXAMPLE}"
    )
}

pub fn feature_edge_cases(requirement: &str) -> String {
    format!(
        "Generate 3-4 additional Gherkin scenarios for: {requirement}
Focus ONLY on edge cases, validation errors, and security concerns.
Do NOT include the Feature header or description.
Start directly with @tags and Scenario: for each scenario.
{SCENARIO_EXAMPLE}"
    )
}

pub fn feature_improve(requirement: &str, draft: &str) -> String {
    format!(
        "Original requirement: {requirement}

Improve this Gherkin feature file:

{draft}

IMPORTANT: Output ONLY the improved feature file in Gherkin format.
Start with 'Feature:' and use proper Gherkin keywords.
Do not include any explanations or thoughts.

Add scenarios for:
1. Missing edge cases and error conditions
2. Data validation and boundary tests
3. Security and performance tests
4. Integration tests with external systems
5. Concurrent operations and state changes"
    )
}

pub fn script_guided(requirement: &str) -> String {
    format!(
        "Create a Selenium test script for the following scenario: {requirement}

Requirements:
1. Use pytest with Selenium WebDriver
2. Include proper imports and fixtures
3. Use explicit waits with WebDriverWait
4. Include proper By selectors and assertions
5. Handle driver setup and cleanup
6. Add proper error handling
7. Follow Selenium best practices
8. Make sure the code is complete and runnable"
    )
}

pub fn script_plain(requirement: &str) -> String {
    format!(
        "Generate a Selenium test script in Python for the following requirement:
{requirement}

Include:
1. Proper setup and teardown
2. WebDriverWait for elements
3. Try-except blocks for error handling
4. Clear comments and docstrings
5. Page Object Model if appropriate"
    )
}

pub fn testcase_initial(user_story: &str) -> String {
    format!(
        "Convert this user story into detailed manual test cases with CONCRETE, SPECIFIC test data values:

{user_story}

For each test case, provide:
1. Test Case ID (format: TC_[number])
2. Description
3. Detailed Test Steps
4. 5 DIFFERENT Test Data sets (each must contain ACTUAL VALUES, not descriptions)
5. Expected Results for each data set

TEST DATA REQUIREMENTS:
- Each test data set must contain SPECIFIC VALUES that can be used directly in testing
- Never use generic descriptions like \"valid data\" or \"invalid credentials\"

GOOD: \"Username: admin@example.com, Password: Admin123!\", \"Age: 17 (below minimum allowed)\"
BAD: \"Valid credentials\", \"Invalid data\", \"Special characters\"

Separate test cases with a blank line. Output format for each test case (use exactly these headers):
Test Case ID: [ID]
Description: [description]
Test Steps:
1. [step 1]
2. [step 2]
Test Data Set 1: [CONCRETE VALUES]
Test Data Set 2: [CONCRETE EDGE CASE VALUES]
Test Data Set 3: [CONCRETE INVALID VALUES]
Test Data Set 4: [CONCRETE SPECIAL CHARACTER VALUES]
Test Data Set 5: [CONCRETE EMPTY/NULL VALUES]
Expected Result: [detailed expected result for each data set]"
    )
}

pub fn testcase_improve(content: &str) -> String {
    format!(
        "Review and improve these test cases with STRICT FOCUS on making test data CONCRETE and SPECIFIC:
{content}

Required Improvements:
1. REPLACE ALL generic test data descriptions with ACTUAL VALUES
2. Ensure each test data set contains COMPLETE, USABLE VALUES
3. Make values realistic and representative of real-world scenarios

BAD: \"Valid credentials\"
GOOD: \"Username: jane.doe@company.com, Password: Str0ngP@ss!2023\"

Output ONLY the improved test cases in the same format, with ALL test data sets containing CONCRETE VALUES."
    )
}

pub fn chat_system(context: &str) -> String {
    format!(
        "You are a helpful assistant specializing in {context}. \
Provide concise, accurate, and helpful responses."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_prompts_embed_the_requirement() {
        let requirement = "Users reset their password by email";
        for prompt in [
            feature_header(requirement),
            feature_scenarios(requirement),
            feature_edge_cases(requirement),
            script_guided(requirement),
            script_plain(requirement),
            testcase_initial(requirement),
        ] {
            assert!(prompt.contains(requirement));
        }
    }

    #[test]
    fn improve_prompt_carries_requirement_and_draft() {
        let prompt = feature_improve("Login", "Feature: Login\n  Scenario: ok");
        assert!(prompt.starts_with("Original requirement: Login"));
        assert!(prompt.contains("Feature: Login\n  Scenario: ok"));
    }

    #[test]
    fn testcase_prompt_lists_every_field_prefix() {
        let prompt = testcase_initial("story");
        for column in testsmith_core::TEST_CASE_COLUMNS {
            assert!(prompt.contains(&format!("{column}:")), "missing {column}");
        }
    }

    #[test]
    fn chat_system_names_context() {
        assert_eq!(
            chat_system("QA Testing"),
            "You are a helpful assistant specializing in QA Testing. \
             Provide concise, accurate, and helpful responses."
        );
    }
}
