// ABOUTME: Defines the ModelGateway trait every LLM backend adapter implements.
// ABOUTME: Also defines Completion (what a call returns) and GatewayError (what can go wrong).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use testsmith_core::{GenerationError, GenerationParams};

/// Text produced by a single model call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub content: String,
    /// Provider stop reason, e.g. "stop" or "length".
    pub finish_reason: Option<String>,
}

impl Completion {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            finish_reason: Some("stop".to_string()),
        }
    }
}

/// Errors that can occur while calling or constructing a gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Missing configuration: {0}")]
    MissingConfig(String),
}

impl From<GatewayError> for GenerationError {
    fn from(err: GatewayError) -> Self {
        GenerationError::Upstream(err.to_string())
    }
}

/// A chat-completion backend. Takes one user prompt plus parameters and
/// returns the model's text. System instructions travel in the parameters.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Completion, GatewayError>;

    /// Provider name for logging (e.g. "groq", "openai").
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_error_display() {
        let errors = vec![
            GatewayError::ProviderError("connection reset".to_string()),
            GatewayError::InvalidResponse("missing choices".to_string()),
            GatewayError::RateLimited,
            GatewayError::Unauthorized("check GROQ_API_KEY".to_string()),
            GatewayError::MissingConfig("OPENAI_API_KEY not set".to_string()),
        ];

        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(messages[0], "Provider error: connection reset");
        assert_eq!(messages[2], "Rate limited");
        assert!(messages[3].contains("GROQ_API_KEY"));
        assert!(messages[4].starts_with("Missing configuration"));
    }

    #[test]
    fn gateway_errors_become_upstream_failures() {
        let err: GenerationError = GatewayError::RateLimited.into();
        assert_eq!(err, GenerationError::Upstream("Rate limited".to_string()));
        assert_eq!(err.kind(), "upstream");
    }

    #[test]
    fn text_completion_stops_normally() {
        let completion = Completion::text("Feature: X");
        assert_eq!(completion.content, "Feature: X");
        assert_eq!(completion.finish_reason.as_deref(), Some("stop"));
    }
}
