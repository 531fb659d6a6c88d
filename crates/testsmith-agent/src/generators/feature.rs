// ABOUTME: Gherkin feature generator: three drafting stages, guarded improvement passes, formatting.
// ABOUTME: Records token diagnostics for every call and falls back to a skeleton feature on model failure.

use std::sync::Arc;

use testsmith_core::cleaner::clean_gherkin;
use testsmith_core::gherkin::{fallback_feature, format_feature};
use testsmith_core::naming::feature_file_name;
use testsmith_core::{
    CallReport, GenerateRequest, GenerationError, GenerationParams, GenerationResult, Grammar,
    OutputValidator, TokenCounter, TokenDebug, TokenDiagnostics,
};
use testsmith_store::ArtifactStore;

use crate::gateway::ModelGateway;
use crate::generators::accept_revision;
use crate::prompts;

/// Input token budget of the feature model.
pub const MAX_INPUT_TOKENS: usize = 8192;

pub const SUCCESS_MESSAGE: &str = "Test cases generated successfully";
pub const FALLBACK_MESSAGE: &str = "Basic test cases generated (fallback mode)";

pub struct FeatureGenerator {
    gateway: Arc<dyn ModelGateway>,
    params: GenerationParams,
    validator: OutputValidator,
    store: ArtifactStore,
}

impl FeatureGenerator {
    pub fn default_params() -> GenerationParams {
        GenerationParams::new("deepseek-r1-distill-llama-70b", 0.6, 1024)
            .top_p(0.95)
            .system(prompts::FEATURE_INSTRUCTIONS)
    }

    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        params: GenerationParams,
        counter: TokenCounter,
        store: ArtifactStore,
    ) -> Self {
        Self {
            gateway,
            params,
            validator: OutputValidator::new(counter, Grammar::Gherkin),
            store,
        }
    }

    /// Generate, format and persist a feature file for the request's input text.
    pub async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let requirement = request.input_text().ok_or_else(|| {
            GenerationError::Validation("No requirement or text provided".to_string())
        })?;
        let file_name = feature_file_name(request.feature_name.as_deref());
        let iterations = request.iterations_clamped();

        let counter = self.validator.counter();
        let mut debug = TokenDebug::new(counter.count(requirement), MAX_INPUT_TOKENS);
        if debug.input.truncated {
            let input_tokens = debug.input.total_tokens;
            tracing::warn!(
                tokens = input_tokens,
                max = MAX_INPUT_TOKENS,
                "feature input exceeds the model's input budget"
            );
        }
        tracing::info!(file = %file_name, iterations, "generating feature");

        let mut content = match self.draft(requirement, &mut debug).await {
            Ok(draft) => draft,
            Err(err) => {
                tracing::warn!(error = %err, "feature drafting failed; using fallback skeleton");
                return self.fallback(&file_name);
            }
        };

        for pass in 1..iterations {
            let prompt = prompts::feature_improve(requirement, &content);
            match self.call("improve", &prompt, &mut debug).await {
                Ok(raw) => {
                    let revised = clean_gherkin(&raw);
                    if accept_revision(&content, &revised) {
                        content = revised;
                    } else {
                        tracing::warn!(pass, "improvement regressed; keeping prior draft");
                    }
                }
                Err(err) => {
                    tracing::warn!(pass, error = %err, "improvement call failed; keeping prior draft");
                }
            }
        }

        let content = format_feature(&content);
        debug.finish(
            counter.count(&content),
            self.validator.is_truncated(&content, self.params.max_tokens),
        );

        let path = self.store.save_feature(&file_name, &content)?;
        let log_file = match self.store.save_token_debug(&debug) {
            Ok(path) => Some(path.display().to_string()),
            Err(err) => {
                tracing::warn!(error = %err, "could not persist token debug log");
                None
            }
        };

        let mut result = GenerationResult::success(content, SUCCESS_MESSAGE)
            .with_token_debug(TokenDiagnostics::Single(debug.summary(log_file)));
        result.feature_file = Some(path.display().to_string());
        result.filename = Some(file_name);
        Ok(result)
    }

    /// Header, core scenarios and edge cases, each cleaned and joined by blank lines.
    async fn draft(
        &self,
        requirement: &str,
        debug: &mut TokenDebug,
    ) -> Result<String, GenerationError> {
        let stages = [
            ("header", prompts::feature_header(requirement)),
            ("scenarios", prompts::feature_scenarios(requirement)),
            ("edge_cases", prompts::feature_edge_cases(requirement)),
        ];

        let mut parts = Vec::with_capacity(stages.len());
        for (stage, prompt) in &stages {
            let raw = self.call(stage, prompt, debug).await?;
            let part = clean_gherkin(&raw);
            if !part.is_empty() {
                parts.push(part);
            }
        }

        if parts.is_empty() {
            return Err(GenerationError::Parse(
                "model returned no Gherkin content".to_string(),
            ));
        }
        Ok(parts.join("\n\n"))
    }

    async fn call(
        &self,
        stage: &str,
        prompt: &str,
        debug: &mut TokenDebug,
    ) -> Result<String, GenerationError> {
        let counter = self.validator.counter();
        let prompt_tokens = counter.count(prompt);
        let completion = self.gateway.complete(prompt, &self.params).await?;

        let response_tokens = counter.count(&completion.content);
        let truncated = self
            .validator
            .is_truncated(&completion.content, self.params.max_tokens);
        tracing::debug!(stage, prompt_tokens, response_tokens, truncated, "feature stage");

        debug.record_exchange(
            CallReport::new(stage, prompt_tokens, prompt_tokens > MAX_INPUT_TOKENS),
            CallReport::new(stage, response_tokens, truncated),
        );
        Ok(completion.content)
    }

    fn fallback(&self, file_name: &str) -> Result<GenerationResult, GenerationError> {
        let title = file_name.trim_end_matches(".feature");
        let content = fallback_feature(title);
        let path = self.store.save_feature(file_name, &content)?;

        let mut result = GenerationResult::success(content, FALLBACK_MESSAGE);
        result.feature_file = Some(path.display().to_string());
        result.filename = Some(file_name.to_string());
        Ok(result)
    }
}
