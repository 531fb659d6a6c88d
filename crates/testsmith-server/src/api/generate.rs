// ABOUTME: POST /generate: routes one request, or fans an oversized one out through the chunk aggregator.
// ABOUTME: Maps error results to 400, aggregation failures to 500 and request timeouts to 408.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::Value;

use testsmith_agent::{AggregateError, ChunkAggregator};
use testsmith_core::{DEFAULT_CHUNK_SIZE, GenerateRequest, GenerationError, GenerationResult};

use crate::api::error_response;
use crate::app_state::SharedState;

pub const TIMEOUT_MESSAGE: &str =
    "Taking too long to generate. Please try with a simpler request or fewer scenarios.";

/// HTTP-only request fields that sit next to the generation request in the body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChunkOptions {
    #[serde(default)]
    chunk_input: bool,
    #[serde(default = "default_chunk_size")]
    chunk_size: usize,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            chunk_input: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

/// POST /generate
pub async fn generate(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    let options: ChunkOptions = serde_json::from_value(body.clone()).unwrap_or_default();

    if options.chunk_input
        && let Ok(request) = serde_json::from_value::<GenerateRequest>(body.clone())
        && ChunkAggregator::should_chunk(&request, options.chunk_size)
    {
        return generate_chunked(&state, request, options.chunk_size).await;
    }
    generate_single(&state, body).await
}

async fn generate_single(state: &SharedState, body: Value) -> Response {
    let router = state.router.clone();
    let task = tokio::spawn(async move { router.route_value(&body).await });

    match tokio::time::timeout(state.request_timeout, task).await {
        Ok(Ok(result)) => respond(result),
        Ok(Err(err)) => {
            tracing::error!(error = %err, "generation task failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Unexpected error: {err}"),
            )
        }
        Err(_) => {
            tracing::warn!(
                timeout_secs = state.request_timeout.as_secs(),
                "generation timed out"
            );
            error_response(StatusCode::REQUEST_TIMEOUT, TIMEOUT_MESSAGE)
        }
    }
}

async fn generate_chunked(
    state: &SharedState,
    request: GenerateRequest,
    chunk_size: usize,
) -> Response {
    match state.aggregator.aggregate(request, chunk_size).await {
        Ok(result) => respond(result),
        Err(AggregateError::Generation(GenerationError::Validation(message))) => {
            error_response(StatusCode::BAD_REQUEST, message)
        }
        Err(err) => {
            tracing::error!(error = %err, "chunked generation failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn respond(result: GenerationResult) -> Response {
    if result.is_success() {
        (StatusCode::OK, Json(result)).into_response()
    } else {
        error_response(StatusCode::BAD_REQUEST, result.message)
    }
}

#[cfg(test)]
mod tests {
    use crate::app_state::AppState;
    use crate::routes::create_router;
    use axum::body::Body;
    use http::Request;
    use std::sync::Arc;
    use std::time::Duration;
    use testsmith_agent::GatewayError;
    use testsmith_agent::testing::{FnGateway, ScriptedGateway};
    use tower::ServiceExt;

    const DOCUMENT: &str = "# Login\nUsers sign in with their email and password.\n\
# Signup\nVisitors register a new account by email.\n\
# Reset\nUsers reset a forgotten password by email link.\n";

    async fn post(
        state: crate::app_state::SharedState,
        body: serde_json::Value,
    ) -> (u16, serde_json::Value) {
        let resp = create_router(state)
            .oneshot(
                Request::post("/generate")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status().as_u16();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn scenario_reply(prompt: &str) -> Result<String, GatewayError> {
        let n = (1..=3)
            .find(|n| prompt.contains(&format!("CHUNK {n} OF 3")))
            .unwrap_or(0);
        Ok(format!(
            "Scenario: Covers chunk {n}\nGiven section {n}\nWhen it is exercised\nThen it behaves."
        ))
    }

    #[tokio::test]
    async fn chat_request_succeeds() {
        let tmp = tempfile::TempDir::new().unwrap();
        let gateway = Arc::new(ScriptedGateway::new().reply("Use explicit waits."));
        let state = AppState::for_tests(gateway, tmp.path(), Duration::from_secs(60));

        let (status, json) = post(
            state,
            serde_json::json!({ "agentType": "chat", "text": "How do I test a flaky login page?" }),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(json["status"], "success");
        assert_eq!(json["content"], "Use explicit waits.");
        assert_eq!(json["message"], "Response generated successfully");
    }

    #[tokio::test]
    async fn error_results_map_to_bad_request() {
        let tmp = tempfile::TempDir::new().unwrap();
        let state =
            AppState::for_tests(Arc::new(ScriptedGateway::new()), tmp.path(), Duration::from_secs(60));

        let (status, json) = post(
            state.clone(),
            serde_json::json!({ "agentType": "foobar", "requirement": "Generate login tests" }),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(json["status"], "error");
        assert!(json["message"].as_str().unwrap().contains("Supported types"));
        assert!(json.get("content").is_none());

        let (status, json) = post(state, serde_json::json!(["not", "an", "object"])).await;
        assert_eq!(status, 400);
        assert_eq!(json["message"], "Invalid request format");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_generation_times_out() {
        let tmp = tempfile::TempDir::new().unwrap();
        let gateway = FnGateway::new(|_prompt: &str| Ok("too late".to_string()))
            .slow_on("login", Duration::from_secs(600));
        let state = AppState::for_tests(Arc::new(gateway), tmp.path(), Duration::from_secs(5));

        let (status, json) = post(
            state,
            serde_json::json!({ "agentType": "selenium", "requirement": "Click the login button" }),
        )
        .await;

        assert_eq!(status, 408);
        assert_eq!(json["message"], super::TIMEOUT_MESSAGE);
    }

    #[tokio::test]
    async fn oversized_input_is_aggregated() {
        let tmp = tempfile::TempDir::new().unwrap();
        let state = AppState::for_tests(
            Arc::new(FnGateway::new(scenario_reply)),
            tmp.path(),
            Duration::from_secs(60),
        );

        let (status, json) = post(
            state,
            serde_json::json!({
                "agentType": "gherkin",
                "requirement": DOCUMENT,
                "featureName": "accounts",
                "iterations": 1,
                "chunkInput": true,
                "chunkSize": 60
            }),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(json["message"], "Generated from 3 chunks of input");
        assert_eq!(json["filename"], "accounts.feature");
        assert_eq!(json["token_debug"]["chunks"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn short_input_skips_chunking() {
        let tmp = tempfile::TempDir::new().unwrap();
        let gateway = Arc::new(ScriptedGateway::new().reply("Noted."));
        let state = AppState::for_tests(gateway.clone(), tmp.path(), Duration::from_secs(60));

        let (status, json) = post(
            state,
            serde_json::json!({
                "agentType": "chat",
                "requirement": "What is a test oracle?",
                "chunkInput": true
            }),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(json["content"], "Noted.");
        assert!(!gateway.prompts()[0].contains("PARTIAL INPUT"));
    }

    #[tokio::test]
    async fn all_chunks_failing_is_server_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let gateway = FnGateway::new(|_prompt: &str| Err(GatewayError::RateLimited));
        let state = AppState::for_tests(Arc::new(gateway), tmp.path(), Duration::from_secs(60));

        let (status, json) = post(
            state,
            serde_json::json!({
                "agentType": "selenium",
                "requirement": DOCUMENT,
                "chunkInput": true,
                "chunkSize": 60
            }),
        )
        .await;

        assert_eq!(status, 500);
        assert_eq!(json["message"], "Failed to process any chunks of the input");
    }
}
