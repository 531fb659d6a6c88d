// ABOUTME: The uniform outbound result every generator and the router produce.
// ABOUTME: Always {status, message}; success adds content, file names and token diagnostics.

use serde::{Deserialize, Serialize};

use crate::diagnostics::TokenDiagnostics;
use crate::error::GenerationError;
use crate::testcase::TestCase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Result of a routed generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub status: Status,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Bare file name of the persisted artifact, usable with the download endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_cases: Option<Vec<TestCase>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_debug: Option<TokenDiagnostics>,
}

impl GenerationResult {
    /// A successful result carrying the given content and message.
    pub fn success(content: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            message: message.into(),
            ..Self::empty(Status::Success)
        }
    }

    /// An error result with only a message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::empty(Status::Error)
        }
    }

    /// A successful result carrying parsed test cases. Display content and
    /// message are left for the router to fill in.
    pub fn with_test_cases(cases: Vec<TestCase>) -> Self {
        Self {
            count: Some(cases.len()),
            test_cases: Some(cases),
            ..Self::empty(Status::Success)
        }
    }

    fn empty(status: Status) -> Self {
        Self {
            status,
            message: String::new(),
            content: None,
            filename: None,
            feature_file: None,
            file_path: None,
            script_file: None,
            note: None,
            count: None,
            test_cases: None,
            token_debug: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    pub fn with_token_debug(mut self, debug: TokenDiagnostics) -> Self {
        self.token_debug = Some(debug);
        self
    }
}

impl From<GenerationError> for GenerationResult {
    fn from(err: GenerationError) -> Self {
        GenerationResult::error(err.to_string())
    }
}
