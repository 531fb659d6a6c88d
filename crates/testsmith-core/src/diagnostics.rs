// ABOUTME: Token budget reports recorded for every model call, plus chunk-level aggregation.
// ABOUTME: Diagnostics only; nothing here ever blocks or alters a response.

use serde::{Deserialize, Serialize};

/// Token accounting for the raw user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputReport {
    pub total_tokens: usize,
    /// The input alone exceeds the model's input budget.
    pub truncated: bool,
    pub max_tokens: usize,
}

/// Token accounting for a single prompt or response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallReport {
    pub name: String,
    pub tokens: usize,
    pub truncated: bool,
}

impl CallReport {
    pub fn new(name: impl Into<String>, tokens: usize, truncated: bool) -> Self {
        Self {
            name: name.into(),
            tokens,
            truncated,
        }
    }
}

/// Token accounting for the assembled artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedReport {
    pub tokens: usize,
    pub truncated: bool,
}

/// Full per-request log, persisted next to the artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDebug {
    pub input: InputReport,
    pub prompts: Vec<CallReport>,
    pub responses: Vec<CallReport>,
    pub combined: CombinedReport,
}

impl TokenDebug {
    pub fn new(input_tokens: usize, max_input_tokens: usize) -> Self {
        Self {
            input: InputReport {
                total_tokens: input_tokens,
                truncated: input_tokens > max_input_tokens,
                max_tokens: max_input_tokens,
            },
            prompts: Vec::new(),
            responses: Vec::new(),
            combined: CombinedReport::default(),
        }
    }

    /// Log one prompt and the response it produced.
    pub fn record_exchange(&mut self, prompt: CallReport, response: CallReport) {
        self.prompts.push(prompt);
        self.responses.push(response);
    }

    /// Record the token count of the final assembled artifact.
    pub fn finish(&mut self, tokens: usize, truncated: bool) {
        self.combined = CombinedReport { tokens, truncated };
    }

    /// Condense the log into the summary returned to callers.
    pub fn summary(&self, log_file: Option<String>) -> TokenDebugSummary {
        TokenDebugSummary {
            input_tokens: self.input.total_tokens,
            output_tokens: self.combined.tokens,
            input_truncated: self.input.truncated,
            output_truncated: self.combined.truncated,
            log_file,
        }
    }
}

/// The compact token report attached to a single generation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDebugSummary {
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub input_truncated: bool,
    pub output_truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

/// One chunk's contribution to an aggregated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkTokenReport {
    pub chunk: usize,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub input_truncated: bool,
    pub output_truncated: bool,
}

/// Token report for a request that was split into chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkedTokenDebug {
    pub chunks: Vec<ChunkTokenReport>,
    pub total_input_tokens: usize,
    pub total_output_tokens: usize,
    pub any_input_truncated: bool,
    pub any_output_truncated: bool,
}

impl ChunkedTokenDebug {
    /// Append a chunk's summary and fold it into the totals.
    pub fn record(&mut self, chunk: usize, summary: &TokenDebugSummary) {
        self.chunks.push(ChunkTokenReport {
            chunk,
            input_tokens: summary.input_tokens,
            output_tokens: summary.output_tokens,
            input_truncated: summary.input_truncated,
            output_truncated: summary.output_truncated,
        });
        self.total_input_tokens += summary.input_tokens;
        self.total_output_tokens += summary.output_tokens;
        self.any_input_truncated |= summary.input_truncated;
        self.any_output_truncated |= summary.output_truncated;
    }
}

/// Either shape of token report a result may carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenDiagnostics {
    Chunked(ChunkedTokenDebug),
    Single(TokenDebugSummary),
}
