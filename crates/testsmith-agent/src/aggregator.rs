// ABOUTME: Fan-out/fan-in over chunks of an oversized requirement, one routed task per chunk.
// ABOUTME: Failed or timed-out chunks are skipped; the surviving contents are merged into one feature file.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;

use testsmith_core::naming::{feature_file_name, script_file_name};
use testsmith_core::{
    ChunkInfo, ChunkedTokenDebug, GenerateRequest, GenerationError, GenerationResult,
    TokenDiagnostics, chunk_by_sections,
};
use testsmith_store::ArtifactStore;

use crate::router::AgentRouter;

pub const DEFAULT_CHUNK_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Failed to process any chunks of the input")]
    NoChunksSucceeded,

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

pub struct ChunkAggregator {
    router: Arc<AgentRouter>,
    store: ArtifactStore,
    chunk_timeout: Duration,
}

impl ChunkAggregator {
    pub fn new(router: Arc<AgentRouter>, store: ArtifactStore, chunk_timeout: Duration) -> Self {
        Self {
            router,
            store,
            chunk_timeout,
        }
    }

    /// True when the request's input is longer than `chunk_size` characters.
    pub fn should_chunk(request: &GenerateRequest, chunk_size: usize) -> bool {
        request
            .input_text()
            .is_some_and(|text| text.chars().count() > chunk_size)
    }

    /// Split the input, route every chunk concurrently, and merge what succeeds.
    ///
    /// Each chunk runs on its own task under `chunk_timeout`. A chunk that times
    /// out is abandoned rather than cancelled, so it may still finish writing its
    /// own `<name>_chunk<n>` artifacts after this returns.
    pub async fn aggregate(
        &self,
        request: GenerateRequest,
        chunk_size: usize,
    ) -> Result<GenerationResult, AggregateError> {
        let input = request
            .input_text()
            .ok_or_else(|| {
                GenerationError::Validation("No requirement or text provided".to_string())
            })?
            .to_string();
        let chunks = chunk_by_sections(&input, chunk_size);
        let total = chunks.len();

        let file_name = feature_file_name(request.feature_name.as_deref());
        let feature_base = file_name.trim_end_matches(".feature").to_string();
        let script_name = script_file_name(request.test_name.as_deref());
        let script_base = script_name.trim_end_matches(".py").to_string();
        tracing::info!(
            chars = input.chars().count(),
            chunks = total,
            file = %file_name,
            "processing input in chunks"
        );

        let tasks = chunks.into_iter().enumerate().map(|(index, chunk)| {
            let number = index + 1;
            let mut derived = request.clone();
            derived.set_input_text(chunk);
            derived.chunk_info = Some(ChunkInfo {
                is_chunk: true,
                chunk_number: number,
                total_chunks: total,
            });
            derived.feature_name = Some(format!("{feature_base}_chunk{number}"));
            derived.test_name = Some(format!("{script_base}_chunk{number}"));

            let router = self.router.clone();
            let handle = tokio::spawn(async move { router.route(derived).await });
            let timeout = self.chunk_timeout;
            async move { (number, tokio::time::timeout(timeout, handle).await) }
        });
        let outcomes = join_all(tasks).await;

        let mut contents = Vec::with_capacity(total);
        let mut tokens = ChunkedTokenDebug::default();
        for (number, outcome) in outcomes {
            match outcome {
                Ok(Ok(result)) if result.is_success() => {
                    if let Some(TokenDiagnostics::Single(summary)) = &result.token_debug {
                        tokens.record(number, summary);
                    }
                    contents.push(result.content.unwrap_or_default());
                }
                Ok(Ok(result)) => {
                    tracing::warn!(chunk = number, message = %result.message, "chunk failed; skipping");
                }
                Ok(Err(err)) => {
                    tracing::warn!(chunk = number, error = %err, "chunk task aborted; skipping");
                }
                Err(_) => {
                    tracing::warn!(
                        chunk = number,
                        timeout_secs = self.chunk_timeout.as_secs_f64(),
                        "chunk timed out; skipping"
                    );
                }
            }
        }

        if contents.is_empty() {
            tracing::error!(chunks = total, "no chunk produced content");
            return Err(AggregateError::NoChunksSucceeded);
        }
        tracing::info!(succeeded = contents.len(), chunks = total, "chunks merged");

        let combined = contents.join("\n\n");
        let path = self
            .store
            .save_feature(&file_name, &combined)
            .map_err(GenerationError::from)?;

        let mut result =
            GenerationResult::success(combined, format!("Generated from {total} chunks of input"))
                .with_token_debug(TokenDiagnostics::Chunked(tokens));
        result.feature_file = Some(path.display().to_string());
        result.filename = Some(file_name);
        Ok(result)
    }
}
