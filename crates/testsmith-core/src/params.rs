// ABOUTME: Immutable model configuration owned by each generator.
// ABOUTME: Passed by reference to the model gateway on every call; never mutated per request.

use serde::{Deserialize, Serialize};

/// Sampling and sizing parameters for one generator's model calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    /// Output budget in model tokens; also the reference for truncation checks.
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    /// Standing instructions sent as the system message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

impl GenerationParams {
    pub fn new(model: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            temperature,
            max_tokens,
            top_p: None,
            presence_penalty: None,
            frequency_penalty: None,
            system: None,
        }
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn penalties(mut self, presence: f32, frequency: f32) -> Self {
        self.presence_penalty = Some(presence);
        self.frequency_penalty = Some(frequency);
        self
    }

    pub fn system(mut self, instructions: impl Into<String>) -> Self {
        self.system = Some(instructions.into());
        self
    }

    /// Same parameters with a different model id.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_optional_fields() {
        let params = GenerationParams::new("llama-3.3-70b-versatile", 0.7, 1024)
            .top_p(0.9)
            .penalties(0.1, 0.2)
            .system("be terse");

        assert_eq!(params.top_p, Some(0.9));
        assert_eq!(params.presence_penalty, Some(0.1));
        assert_eq!(params.frequency_penalty, Some(0.2));
        assert_eq!(params.system.as_deref(), Some("be terse"));
        assert_eq!(params.with_model("other").model, "other");
    }
}
