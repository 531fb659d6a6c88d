// ABOUTME: Core types and pure text processing for testsmith.
// ABOUTME: Requests/results, chunking, truncation checks, output cleaning, Gherkin formatting and test-case parsing.

pub mod chunker;
pub mod cleaner;
pub mod diagnostics;
pub mod error;
pub mod gherkin;
pub mod naming;
pub mod params;
pub mod plausibility;
pub mod request;
pub mod result;
pub mod testcase;
pub mod tokens;
pub mod validator;

pub use chunker::{DEFAULT_CHUNK_SIZE, chunk_by_sections};
pub use diagnostics::{
    CallReport, ChunkedTokenDebug, TokenDebug, TokenDebugSummary, TokenDiagnostics,
};
pub use error::GenerationError;
pub use params::GenerationParams;
pub use plausibility::PlausibilityPolicy;
pub use request::{AgentKind, ChunkInfo, GenerateRequest, SUPPORTED_AGENT_TYPES, ScriptFormat};
pub use result::{GenerationResult, Status};
pub use testcase::{TEST_CASE_COLUMNS, TestCase, parse_test_cases, render_for_display};
pub use tokens::{TokenCounter, TokenizerError};
pub use validator::{Grammar, OutputValidator};
