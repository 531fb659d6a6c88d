// ABOUTME: Conversational QA assistant: one model call framed by a topic context.
// ABOUTME: On gateway failure answers with a canned, keyword-matched reply instead of an error.

use std::sync::Arc;

use testsmith_core::{GenerateRequest, GenerationError, GenerationParams, GenerationResult};

use crate::gateway::ModelGateway;
use crate::prompts;

pub const DEFAULT_CONTEXT: &str = "QA Testing";
pub const SUCCESS_MESSAGE: &str = "Response generated successfully";
pub const FALLBACK_MESSAGE: &str = "Generated fallback response due to API error";

/// Canned replies; the first keyword found in the message wins.
const FALLBACK_REPLIES: [(&str, &str); 9] = [
    (
        "help",
        "I'm here to help with your QA testing needs. What specific assistance do you need?",
    ),
    (
        "test",
        "Testing is a critical part of the software development lifecycle. What kind of tests are you working on?",
    ),
    (
        "gherkin",
        "Gherkin is a language that helps you describe software behavior without detailing how that behavior is implemented.",
    ),
    (
        "selenium",
        "Selenium is a popular tool for automating web browsers, often used for testing web applications.",
    ),
    (
        "playwright",
        "Playwright is a framework for Web Testing and Automation that allows testing across all modern browsers.",
    ),
    (
        "cypress",
        "Cypress is a front end testing tool built for the modern web, making asynchronous testing simple.",
    ),
    (
        "behave",
        "Behave is a BDD (Behavior-Driven Development) testing framework for Python.",
    ),
    (
        "feature",
        "Feature files in Gherkin describe a single feature of the system using scenarios and steps.",
    ),
    (
        "scenario",
        "Scenarios in Gherkin describe a specific business situation using steps with Given, When, Then format.",
    ),
];

pub struct ChatGenerator {
    gateway: Arc<dyn ModelGateway>,
    params: GenerationParams,
}

impl ChatGenerator {
    pub fn default_params() -> GenerationParams {
        GenerationParams::new("gpt-3.5-turbo", 0.7, 500)
    }

    pub fn new(gateway: Arc<dyn ModelGateway>, params: GenerationParams) -> Self {
        Self { gateway, params }
    }

    pub async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let message = request
            .input_text()
            .ok_or_else(|| GenerationError::Validation("No message provided".to_string()))?;
        let context = request
            .context
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CONTEXT);

        let params = self.params.clone().system(prompts::chat_system(context));
        match self.gateway.complete(message, &params).await {
            Ok(completion) => Ok(GenerationResult::success(
                completion.content.trim(),
                SUCCESS_MESSAGE,
            )),
            Err(err) => {
                tracing::warn!(
                    provider = self.gateway.provider_name(),
                    error = %err,
                    "chat call failed; answering with fallback"
                );
                Ok(GenerationResult::success(
                    fallback_reply(message, context),
                    FALLBACK_MESSAGE,
                ))
            }
        }
    }
}

/// Keyword-matched canned reply, or a request for more detail about `context`.
pub fn fallback_reply(message: &str, context: &str) -> String {
    let lowered = message.to_lowercase();
    FALLBACK_REPLIES
        .iter()
        .find(|(keyword, _)| lowered.contains(*keyword))
        .map(|(_, reply)| reply.to_string())
        .unwrap_or_else(|| {
            format!(
                "I understand you're asking about {context}. \
                 Could you provide more details so I can assist you better?"
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayError;
    use crate::testing::ScriptedGateway;

    fn chat(gateway: ScriptedGateway) -> (Arc<ScriptedGateway>, ChatGenerator) {
        let gateway = Arc::new(gateway);
        let generator = ChatGenerator::new(gateway.clone(), ChatGenerator::default_params());
        (gateway, generator)
    }

    #[tokio::test]
    async fn reply_is_framed_by_context() {
        let (gateway, generator) = chat(ScriptedGateway::new().reply("  Use explicit waits.  "));
        let request = GenerateRequest {
            context: Some("Selenium".to_string()),
            ..GenerateRequest::new("chat", "How do I avoid flaky tests?")
        };

        let result = generator.generate(&request).await.unwrap();

        assert_eq!(result.content.as_deref(), Some("Use explicit waits."));
        assert_eq!(result.message, SUCCESS_MESSAGE);
        let call = &gateway.calls()[0];
        assert_eq!(call.prompt, "How do I avoid flaky tests?");
        assert_eq!(call.params.model, "gpt-3.5-turbo");
        assert_eq!(call.params.max_tokens, 500);
        assert!(call.params.system.as_deref().unwrap().contains("specializing in Selenium"));
    }

    #[tokio::test]
    async fn context_defaults_to_qa_testing() {
        let (gateway, generator) = chat(ScriptedGateway::new().reply("ok"));
        generator
            .generate(&GenerateRequest::new("chat", "hello there"))
            .await
            .unwrap();
        assert!(gateway.calls()[0]
            .params
            .system
            .as_deref()
            .unwrap()
            .contains("specializing in QA Testing"));
    }

    #[tokio::test]
    async fn gateway_failure_falls_back_to_keyword_reply() {
        let (_gateway, generator) = chat(ScriptedGateway::new().fail(GatewayError::RateLimited));

        let result = generator
            .generate(&GenerateRequest::new("chat", "What is Cypress good for?"))
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.message, FALLBACK_MESSAGE);
        assert!(result.content.unwrap().starts_with("Cypress is a front end testing tool"));
    }

    #[test]
    fn first_listed_keyword_wins() {
        assert!(fallback_reply("help me with selenium", "QA").starts_with("I'm here to help"));
        assert!(fallback_reply("Write a Gherkin scenario", "QA").starts_with("Gherkin is"));
        assert!(fallback_reply("latest selenium test", "QA").starts_with("Testing is"));
    }

    #[test]
    fn unmatched_message_asks_for_detail() {
        assert_eq!(
            fallback_reply("What about invoices?", "Billing"),
            "I understand you're asking about Billing. \
             Could you provide more details so I can assist you better?"
        );
    }
}
