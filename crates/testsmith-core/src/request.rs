// ABOUTME: Inbound request shape and the artifact-kind enumeration the router dispatches on.
// ABOUTME: Wire names follow the camelCase JSON the frontend sends (agentType, featureName, chunkInfo).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Comma-separated list of every accepted `agentType`, used in error messages.
pub const SUPPORTED_AGENT_TYPES: &str =
    "gherkin, selenium, playwright, cypress, behave, chat, manual_testcases, manual_planning";

/// Default number of feature-generation iterations when the request omits it.
pub const DEFAULT_ITERATIONS: u8 = 2;

/// Browser-automation flavours. Only Selenium has a dedicated prompt; the others
/// reuse it and carry a note saying so.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptFormat {
    Selenium,
    Playwright,
    Cypress,
    Behave,
}

impl ScriptFormat {
    pub fn display_name(self) -> &'static str {
        match self {
            ScriptFormat::Selenium => "Selenium",
            ScriptFormat::Playwright => "Playwright",
            ScriptFormat::Cypress => "Cypress",
            ScriptFormat::Behave => "Behave",
        }
    }

    /// Note attached to results for formats that are generated from the Selenium template.
    pub fn note(self) -> Option<String> {
        match self {
            ScriptFormat::Selenium => None,
            other => Some(format!(
                "Using Selenium format as a base for {}",
                other.display_name()
            )),
        }
    }
}

/// The kind of artifact a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    /// Gherkin feature file.
    Feature,
    /// Browser-automation script in the given format.
    Script(ScriptFormat),
    /// Free-form QA conversation.
    Chat,
    /// Manual test case table.
    ManualTestCases,
    /// Manual test plan; same generator as test cases with a "Test Plan:" prefix.
    ManualPlanning,
}

impl AgentKind {
    /// Parse an `agentType` value, case-insensitively. Legacy aliases
    /// (`test_generator`, `selenium_generator`) are accepted.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "gherkin" | "test_generator" => Some(AgentKind::Feature),
            "selenium" | "selenium_generator" => Some(AgentKind::Script(ScriptFormat::Selenium)),
            "playwright" => Some(AgentKind::Script(ScriptFormat::Playwright)),
            "cypress" => Some(AgentKind::Script(ScriptFormat::Cypress)),
            "behave" => Some(AgentKind::Script(ScriptFormat::Behave)),
            "chat" => Some(AgentKind::Chat),
            "manual_testcases" => Some(AgentKind::ManualTestCases),
            "manual_planning" => Some(AgentKind::ManualPlanning),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgentKind::Feature => "gherkin",
            AgentKind::Script(ScriptFormat::Selenium) => "selenium",
            AgentKind::Script(ScriptFormat::Playwright) => "playwright",
            AgentKind::Script(ScriptFormat::Cypress) => "cypress",
            AgentKind::Script(ScriptFormat::Behave) => "behave",
            AgentKind::Chat => "chat",
            AgentKind::ManualTestCases => "manual_testcases",
            AgentKind::ManualPlanning => "manual_planning",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marks a request as one segment of a larger, chunked input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkInfo {
    pub is_chunk: bool,
    /// 1-based position of this chunk.
    pub chunk_number: usize,
    pub total_chunks: usize,
}

/// A generation request as received from the boundary layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub agent_type: String,
    #[serde(default)]
    pub requirement: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub feature_name: Option<String>,
    #[serde(default)]
    pub test_name: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub iterations: Option<i64>,
    /// Topic framing for the chat agent.
    #[serde(default)]
    pub context: Option<String>,
    /// Set by the router when a script alias is served by the Selenium template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_info: Option<ChunkInfo>,
}

impl GenerateRequest {
    /// Convenience constructor for a request carrying only a kind and a requirement.
    pub fn new(agent_type: impl Into<String>, requirement: impl Into<String>) -> Self {
        Self {
            agent_type: agent_type.into(),
            requirement: Some(requirement.into()),
            ..Self::default()
        }
    }

    /// The text to generate from: the requirement if non-empty, else `text`.
    pub fn input_text(&self) -> Option<&str> {
        non_empty(self.requirement.as_deref()).or_else(|| non_empty(self.text.as_deref()))
    }

    /// Replace whichever field `input_text` reads from.
    pub fn set_input_text(&mut self, value: String) {
        if non_empty(self.requirement.as_deref()).is_some() {
            self.requirement = Some(value);
        } else {
            self.text = Some(value);
        }
    }

    /// Prefix the input with a partial-input marker when this request is a chunk.
    /// Returns true when the marker was applied.
    pub fn apply_chunk_marker(&mut self) -> bool {
        let Some(info) = self.chunk_info.filter(|c| c.is_chunk) else {
            return false;
        };
        let Some(input) = self.input_text() else {
            return false;
        };
        let marked = format!(
            "[PARTIAL INPUT - CHUNK {} OF {}]\n\n{}",
            info.chunk_number, info.total_chunks, input
        );
        self.set_input_text(marked);
        true
    }

    /// Requested improvement iterations clamped to 1..=3; defaults to 2.
    pub fn iterations_clamped(&self) -> u8 {
        match self.iterations {
            Some(n) => n.clamp(1, 3) as u8,
            None => DEFAULT_ITERATIONS,
        }
    }

    /// Requested script language, lowercased; defaults to python.
    pub fn language_or_default(&self) -> String {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or("python")
            .to_lowercase()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
