// ABOUTME: Token counting for prompt/response diagnostics using the cl100k_base encoding.
// ABOUTME: The encoding approximates the backend models' tokenizers closely enough for budget checks.

use std::sync::Arc;

use thiserror::Error;
use tiktoken_rs::CoreBPE;

#[derive(Debug, Error)]
#[error("failed to load tokenizer: {0}")]
pub struct TokenizerError(String);

/// Cheaply clonable token counter.
#[derive(Clone)]
pub struct TokenCounter {
    bpe: Arc<CoreBPE>,
}

impl TokenCounter {
    /// Load the cl100k_base encoding.
    pub fn cl100k() -> Result<Self, TokenizerError> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| TokenizerError(e.to_string()))?;
        Ok(Self { bpe: Arc::new(bpe) })
    }

    /// Number of tokens in `text`. Empty text counts as zero.
    pub fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.bpe.encode_ordinary(text).len()
    }
}

impl std::fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCounter")
            .field("encoding", &"cl100k_base")
            .finish()
    }
}
