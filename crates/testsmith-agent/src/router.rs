// ABOUTME: Request router: validates input, applies the chunk marker and plausibility filter, dispatches by kind.
// ABOUTME: The single place where generator errors and panics become {status: error, message} results.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;

use testsmith_core::{
    AgentKind, GenerateRequest, GenerationError, GenerationResult, PlausibilityPolicy,
    SUPPORTED_AGENT_TYPES, TokenCounter, render_for_display,
};
use testsmith_store::ArtifactStore;

use crate::gateway::ModelGateway;
use crate::generators::{
    ChatGenerator, FeatureGenerator, ScriptGenerator, ScriptStyle, TestCaseGenerator,
};

pub const IMPLAUSIBLE_INPUT_MESSAGE: &str = "Please provide a meaningful request related to testing. \
Your input appears to be random text or too short.";
pub const TEST_PLAN_PREFIX: &str = "Test Plan: ";

const TEST_CASES_MESSAGE: &str = "Manual test cases generated successfully";
const TEST_PLAN_MESSAGE: &str = "Test plan generated successfully";

/// Knobs for building a router from gateways with default generator parameters.
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    /// Overrides the model of the feature, script and test case generators.
    pub generator_model: Option<String>,
    /// Overrides the chat model.
    pub chat_model: Option<String>,
    pub script_style: ScriptStyle,
    pub policy: PlausibilityPolicy,
}

pub struct AgentRouter {
    feature: FeatureGenerator,
    script: ScriptGenerator,
    chat: ChatGenerator,
    test_cases: TestCaseGenerator,
    policy: PlausibilityPolicy,
}

impl AgentRouter {
    pub fn new(
        feature: FeatureGenerator,
        script: ScriptGenerator,
        chat: ChatGenerator,
        test_cases: TestCaseGenerator,
        policy: PlausibilityPolicy,
    ) -> Self {
        Self {
            feature,
            script,
            chat,
            test_cases,
            policy,
        }
    }

    /// Build every generator with its default parameters. Feature, script and
    /// test case generation share `generator_gateway`; chat uses `chat_gateway`.
    pub fn with_gateways(
        generator_gateway: Arc<dyn ModelGateway>,
        chat_gateway: Arc<dyn ModelGateway>,
        store: ArtifactStore,
        counter: TokenCounter,
        options: RouterOptions,
    ) -> Self {
        let model = |params: testsmith_core::GenerationParams, over: &Option<String>| match over {
            Some(name) => params.with_model(name.clone()),
            None => params,
        };
        let generator_model = &options.generator_model;

        let feature = FeatureGenerator::new(
            generator_gateway.clone(),
            model(FeatureGenerator::default_params(), generator_model),
            counter,
            store.clone(),
        );
        let script = ScriptGenerator::new(
            generator_gateway.clone(),
            model(ScriptGenerator::default_params(options.script_style), generator_model),
            options.script_style,
            store.clone(),
        );
        let test_cases = TestCaseGenerator::new(
            generator_gateway,
            model(TestCaseGenerator::default_params(), generator_model),
            store,
        );
        let chat = ChatGenerator::new(
            chat_gateway,
            model(ChatGenerator::default_params(), &options.chat_model),
        );

        Self::new(feature, script, chat, test_cases, options.policy)
    }

    pub fn policy(&self) -> &PlausibilityPolicy {
        &self.policy
    }

    /// Route a raw JSON request. Anything but an object is rejected.
    pub async fn route_value(&self, value: &Value) -> GenerationResult {
        if !value.is_object() {
            return GenerationResult::error("Invalid request format");
        }
        match serde_json::from_value::<GenerateRequest>(value.clone()) {
            Ok(request) => self.route(request).await,
            Err(err) => GenerationResult::error(format!("Invalid request format: {err}")),
        }
    }

    /// Validate, mark, filter and dispatch one request. Never fails: every
    /// error, including a generator panic, comes back as an error result.
    pub async fn route(&self, mut request: GenerateRequest) -> GenerationResult {
        let agent_type = request.agent_type.trim().to_lowercase();
        if request.input_text().is_none() {
            return GenerationResult::error("No requirement or text provided");
        }

        if request.apply_chunk_marker()
            && let Some(info) = request.chunk_info
        {
            tracing::info!(
                chunk = info.chunk_number,
                total = info.total_chunks,
                "processing chunk"
            );
        }

        let input = request.input_text().unwrap_or_default();
        if !self.policy.accepts(input) {
            tracing::warn!(agent_type = %agent_type, "rejected implausible input");
            return GenerationResult::error(IMPLAUSIBLE_INPUT_MESSAGE);
        }

        let Some(kind) = AgentKind::parse(&agent_type) else {
            return GenerationResult::error(format!(
                "Unknown agent type: {agent_type}. Supported types: {SUPPORTED_AGENT_TYPES}"
            ));
        };
        tracing::info!(kind = %kind, "routing request");

        match AssertUnwindSafe(self.dispatch(kind, request))
            .catch_unwind()
            .await
        {
            Ok(Ok(result)) => {
                tracing::info!(kind = %kind, status = ?result.status, "generation finished");
                result
            }
            Ok(Err(err)) => {
                tracing::warn!(kind = %kind, error_kind = err.kind(), error = %err, "generation failed");
                GenerationResult::from(err)
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                tracing::error!(kind = %kind, reason = %reason, "generator panicked");
                GenerationResult::error(format!("Error in {kind} generator: {reason}"))
            }
        }
    }

    async fn dispatch(
        &self,
        kind: AgentKind,
        mut request: GenerateRequest,
    ) -> Result<GenerationResult, GenerationError> {
        match kind {
            AgentKind::Feature => self.feature.generate(&request).await,
            AgentKind::Script(format) => {
                if let Some(note) = format.note() {
                    request.note = Some(note);
                }
                self.script.generate(&request, format).await
            }
            AgentKind::Chat => self.chat.generate(&request).await,
            AgentKind::ManualTestCases => {
                let story = request.input_text().unwrap_or_default();
                let result = self.test_cases.generate(story).await?;
                Ok(finish_test_cases(result, TEST_CASES_MESSAGE))
            }
            AgentKind::ManualPlanning => {
                let story = format!(
                    "{TEST_PLAN_PREFIX}{}",
                    request.input_text().unwrap_or_default()
                );
                let result = self.test_cases.generate(&story).await?;
                Ok(finish_test_cases(result, TEST_PLAN_MESSAGE))
            }
        }
    }
}

/// Render records for display, default the message, and mirror the CSV path into `feature_file`.
fn finish_test_cases(mut result: GenerationResult, default_message: &str) -> GenerationResult {
    if let Some(cases) = &result.test_cases {
        result.content = Some(render_for_display(cases));
    }
    if result.message.is_empty() {
        result.message = default_message.to_string();
    }
    if result.feature_file.is_none() {
        result.feature_file = result.file_path.clone();
    }
    result
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayError;
    use crate::testing::{FnGateway, ScriptedGateway};
    use serde_json::json;
    use testsmith_core::{Status, TestCase};
    use tempfile::TempDir;

    const CASE: &str = "Test Case ID: TC_001\nDescription: Valid login\nTest Steps:\n1. Log in\nTest Data Set 1: Username: a@b.co, Password: Pw1!\nExpected Result: Dashboard";

    fn router(gateway: Arc<dyn ModelGateway>) -> (TempDir, AgentRouter) {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path()).unwrap();
        let router = AgentRouter::with_gateways(
            gateway.clone(),
            gateway,
            store,
            TokenCounter::cl100k().unwrap(),
            RouterOptions::default(),
        );
        (tmp, router)
    }

    #[tokio::test]
    async fn implausible_input_never_reaches_a_generator() {
        let gateway = Arc::new(ScriptedGateway::new().reply("unused"));
        let (_tmp, router) = router(gateway.clone());

        let result = router
            .route(GenerateRequest::new("gherkin", "asdkj qwlekj zpx"))
            .await;

        assert_eq!(result.status, Status::Error);
        assert_eq!(result.message, IMPLAUSIBLE_INPUT_MESSAGE);
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_kind_lists_supported_kinds() {
        let gateway = Arc::new(ScriptedGateway::new());
        let (_tmp, router) = router(gateway.clone());

        let result = router
            .route(GenerateRequest::new("foobar", "Generate login tests"))
            .await;

        assert_eq!(result.status, Status::Error);
        assert!(result.message.contains("foobar"));
        for kind in [
            "gherkin",
            "selenium",
            "playwright",
            "cypress",
            "behave",
            "chat",
            "manual_testcases",
            "manual_planning",
        ] {
            assert!(result.message.contains(kind), "missing {kind}");
        }
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_input_is_rejected() {
        let (_tmp, router) = router(Arc::new(ScriptedGateway::new()));
        let request = GenerateRequest {
            agent_type: "chat".to_string(),
            requirement: Some("   ".to_string()),
            ..GenerateRequest::default()
        };

        let result = router.route(request).await;
        assert_eq!(result.message, "No requirement or text provided");
    }

    #[tokio::test]
    async fn non_object_json_is_rejected() {
        let (_tmp, router) = router(Arc::new(ScriptedGateway::new()));

        let result = router.route_value(&json!(["gherkin", "login"])).await;
        assert_eq!(result.message, "Invalid request format");

        let result = router
            .route_value(&json!({ "agentType": "chat", "requirement": "test", "iterations": "many" }))
            .await;
        assert_eq!(result.status, Status::Error);
        assert!(result.message.starts_with("Invalid request format"));
    }

    #[tokio::test]
    async fn chunk_marker_prefixes_the_input() {
        let gateway = Arc::new(ScriptedGateway::new().reply("Noted."));
        let (_tmp, router) = router(gateway.clone());

        let result = router
            .route_value(&json!({
                "agentType": "CHAT",
                "text": "Users can verify their email address",
                "chunkInfo": { "isChunk": true, "chunkNumber": 2, "totalChunks": 3 }
            }))
            .await;

        assert!(result.is_success());
        assert_eq!(
            gateway.prompts()[0],
            "[PARTIAL INPUT - CHUNK 2 OF 3]\n\nUsers can verify their email address"
        );
    }

    #[tokio::test]
    async fn script_aliases_share_the_selenium_generator() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply("```python\nimport pytest\n```")
                .reply("```python\nimport pytest\n```"),
        );
        let (_tmp, router) = router(gateway.clone());

        let selenium = router
            .route(GenerateRequest::new("selenium_generator", "Click the login button"))
            .await;
        let playwright = router
            .route(GenerateRequest::new("playwright", "Click the login button"))
            .await;

        assert!(selenium.is_success());
        assert!(selenium.note.is_none());
        assert_eq!(
            playwright.note.as_deref(),
            Some("Using Selenium format as a base for Playwright")
        );
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn unsupported_language_becomes_error_result() {
        let (_tmp, router) = router(Arc::new(ScriptedGateway::new()));
        let request = GenerateRequest {
            language: Some("java".to_string()),
            ..GenerateRequest::new("selenium", "Click the login button")
        };

        let result = router.route(request).await;
        assert_eq!(result.status, Status::Error);
        assert!(result.message.starts_with("Java Selenium Script Generator"));
    }

    #[tokio::test]
    async fn manual_test_cases_are_rendered_for_display() {
        let gateway = Arc::new(ScriptedGateway::new().reply(CASE));
        let (_tmp, router) = router(gateway);

        let result = router
            .route(GenerateRequest::new("manual_testcases", "As a user I want to log in"))
            .await;

        assert!(result.is_success());
        assert_eq!(result.message, TEST_CASES_MESSAGE);
        let content = result.content.unwrap();
        assert!(content.starts_with("Test Case ID: TC_001\nDescription: Valid login\n"));
        assert!(content.contains("Test Data Set 3:\nMissing concrete test data set 3\n"));
        assert_eq!(result.feature_file, result.file_path);
        assert_eq!(result.count, Some(1));
    }

    #[tokio::test]
    async fn manual_planning_prefixes_the_story() {
        let gateway = Arc::new(ScriptedGateway::new().fail(GatewayError::RateLimited));
        let (_tmp, router) = router(gateway.clone());

        let result = router
            .route(GenerateRequest::new("manual_planning", "Checkout with a saved card"))
            .await;

        assert!(gateway.prompts()[0].contains("Test Plan: Checkout with a saved card"));
        assert_eq!(result.message, TEST_PLAN_MESSAGE);
        assert_eq!(result.test_cases.unwrap(), vec![TestCase::fallback()]);
        assert_eq!(result.filename.as_deref(), Some("test_plan_checkout.csv"));
    }

    #[tokio::test]
    async fn generator_panic_becomes_error_result() {
        let gateway: Arc<dyn ModelGateway> =
            Arc::new(FnGateway::new(|_prompt: &str| -> Result<String, GatewayError> {
                panic!("gateway exploded")
            }));
        let (_tmp, router) = router(gateway);

        let result = router
            .route(GenerateRequest::new("chat", "How do I test a login page?"))
            .await;

        assert_eq!(result.status, Status::Error);
        assert_eq!(result.message, "Error in chat generator: gateway exploded");
    }

    #[test]
    fn default_options_use_guided_scripts() {
        let options = RouterOptions::default();
        assert_eq!(options.script_style, ScriptStyle::Guided);
        assert!(options.generator_model.is_none());
        assert_eq!(options.policy, PlausibilityPolicy::default());
    }
}
