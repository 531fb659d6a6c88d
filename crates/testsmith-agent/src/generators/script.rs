// ABOUTME: Browser-automation script generator shared by every script format.
// ABOUTME: One model call, code-block extraction, optional import preamble, persisted as a Python file.

use std::sync::Arc;

use testsmith_core::cleaner::{extract_code_block, strip_fences, strip_reasoning};
use testsmith_core::naming::script_file_name;
use testsmith_core::{
    GenerateRequest, GenerationError, GenerationParams, GenerationResult, ScriptFormat,
};
use testsmith_store::ArtifactStore;

use crate::gateway::ModelGateway;
use crate::prompts;

pub const SUPPORTED_LANGUAGE: &str = "python";
pub const SUCCESS_MESSAGE: &str = "Selenium script generated successfully";
pub const JAVA_MESSAGE: &str = "Java Selenium Script Generator is currently under development. \
Please use Python for Selenium scripts for now.";

/// Prompt variant for script generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptStyle {
    /// Short QA-engineer prompt; output is used as extracted.
    Plain,
    /// Detailed pytest prompt; output always opens with an import block.
    #[default]
    Guided,
}

impl ScriptStyle {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "plain" => Some(ScriptStyle::Plain),
            "guided" => Some(ScriptStyle::Guided),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScriptStyle::Plain => "plain",
            ScriptStyle::Guided => "guided",
        }
    }
}

pub struct ScriptGenerator {
    gateway: Arc<dyn ModelGateway>,
    params: GenerationParams,
    style: ScriptStyle,
    store: ArtifactStore,
}

impl ScriptGenerator {
    pub fn default_params(style: ScriptStyle) -> GenerationParams {
        match style {
            ScriptStyle::Guided => GenerationParams::new("llama-3.3-70b-versatile", 0.7, 1024)
                .top_p(0.9)
                .penalties(0.1, 0.1)
                .system(prompts::SCRIPT_GUIDED_INSTRUCTIONS),
            ScriptStyle::Plain => GenerationParams::new("llama-3.3-70b-versatile", 0.7, 4000)
                .top_p(0.95)
                .system(prompts::SCRIPT_PLAIN_INSTRUCTIONS),
        }
    }

    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        params: GenerationParams,
        style: ScriptStyle,
        store: ArtifactStore,
    ) -> Self {
        Self {
            gateway,
            params,
            style,
            store,
        }
    }

    pub fn style(&self) -> ScriptStyle {
        self.style
    }

    /// Generate and persist a script. Languages other than Python are refused
    /// before any model call.
    pub async fn generate(
        &self,
        request: &GenerateRequest,
        format: ScriptFormat,
    ) -> Result<GenerationResult, GenerationError> {
        let requirement = request
            .input_text()
            .ok_or_else(|| GenerationError::Validation("No requirement provided".to_string()))?;
        check_language(&request.language_or_default())?;

        let file_name = script_file_name(request.test_name.as_deref());
        tracing::info!(
            format = format.display_name(),
            style = self.style.name(),
            file = %file_name,
            "generating script"
        );

        let prompt = match self.style {
            ScriptStyle::Guided => prompts::script_guided(requirement),
            ScriptStyle::Plain => prompts::script_plain(requirement),
        };
        let completion = self.gateway.complete(&prompt, &self.params).await?;

        let mut content = extract_script(&completion.content);
        if content.is_empty() {
            return Err(GenerationError::Parse(
                "model returned an empty script".to_string(),
            ));
        }
        if self.style == ScriptStyle::Guided && !opens_with_import(&content) {
            content = format!("{}{}", prompts::SELENIUM_PREAMBLE, content);
        }

        let path = self.store.save_script(&file_name, &content)?;
        let path = path.display().to_string();

        let mut result = GenerationResult::success(content, SUCCESS_MESSAGE)
            .with_note(request.note.clone().or_else(|| format.note()));
        result.script_file = Some(path.clone());
        result.feature_file = Some(path);
        result.filename = Some(file_name);
        Ok(result)
    }
}

fn check_language(language: &str) -> Result<(), GenerationError> {
    match language {
        SUPPORTED_LANGUAGE => Ok(()),
        "java" => Err(GenerationError::UnsupportedConfig(JAVA_MESSAGE.to_string())),
        other => Err(GenerationError::UnsupportedConfig(format!(
            "Language \"{other}\" is not currently supported for Selenium scripts. \
             Only Python is supported at this time."
        ))),
    }
}

/// Reasoning tags removed, then the first `python` block, else the unfenced text.
fn extract_script(raw: &str) -> String {
    let text = strip_reasoning(raw);
    match extract_code_block(&text, SUPPORTED_LANGUAGE) {
        Some(code) => code,
        None => strip_fences(&text).trim().to_string(),
    }
}

fn opens_with_import(content: &str) -> bool {
    content.starts_with("import ") || content.starts_with("from ")
}
