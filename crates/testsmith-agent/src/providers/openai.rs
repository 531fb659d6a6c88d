// ABOUTME: Chat Completions adapter implementing ModelGateway for OpenAI-compatible APIs.
// ABOUTME: Serves both the Groq and OpenAI presets; only the base URL and key differ.

use async_trait::async_trait;
use serde_json::{Value, json};

use testsmith_core::GenerationParams;

use crate::gateway::{Completion, GatewayError, ModelGateway};
use crate::providers::Provider;

/// Gateway for any endpoint that implements `POST {base}/v1/chat/completions`.
pub struct OpenAiCompatGateway {
    client: reqwest::Client,
    provider: Provider,
    api_key: String,
    base_url: String,
}

impl OpenAiCompatGateway {
    /// Create a gateway with explicit configuration. A trailing slash on
    /// `base_url` is ignored.
    pub fn new(provider: Provider, api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            provider,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    /// Build the JSON request body for one prompt.
    pub fn build_request_body(prompt: &str, params: &GenerationParams) -> Value {
        let mut messages = Vec::new();
        if let Some(system) = params.system.as_deref()
            && !system.is_empty()
        {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": prompt }));

        let mut body = json!({
            "model": params.model,
            "messages": messages,
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        });

        let optional = [
            ("top_p", params.top_p),
            ("presence_penalty", params.presence_penalty),
            ("frequency_penalty", params.frequency_penalty),
        ];
        for (key, value) in optional.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))) {
            body[key] = json!(value);
        }

        body
    }

    /// Parse a Chat Completions response into a Completion.
    pub fn parse_response(response_body: &Value) -> Result<Completion, GatewayError> {
        let choices = response_body
            .get("choices")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                GatewayError::InvalidResponse("missing choices array in response".to_string())
            })?;

        let choice = choices
            .first()
            .ok_or_else(|| GatewayError::InvalidResponse("empty choices array".to_string()))?;

        let message = choice.get("message").ok_or_else(|| {
            GatewayError::InvalidResponse("missing message in choice".to_string())
        })?;

        let content = match message.get("content") {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => {
                return Err(GatewayError::InvalidResponse(format!(
                    "unexpected content type: {other}"
                )));
            }
        };

        let finish_reason = choice
            .get("finish_reason")
            .and_then(|f| f.as_str())
            .map(String::from);

        Ok(Completion {
            content,
            finish_reason,
        })
    }
}

#[async_trait]
impl ModelGateway for OpenAiCompatGateway {
    async fn complete(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Completion, GatewayError> {
        let body = Self::build_request_body(prompt, params);

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::ProviderError(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GatewayError::RateLimited);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(GatewayError::Unauthorized(format!(
                "check {}",
                self.provider.api_key_var()
            )));
        }

        if status.is_server_error() {
            return Err(GatewayError::ProviderError(format!(
                "Server error: {}",
                status
            )));
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(GatewayError::ProviderError(format!(
                "API error {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(format!("failed to parse JSON: {}", e)))?;

        let completion = Self::parse_response(&response_body)?;
        tracing::debug!(
            provider = self.provider.name(),
            model = %params.model,
            finish_reason = completion.finish_reason.as_deref().unwrap_or("unknown"),
            chars = completion.content.len(),
            "completion received"
        );
        Ok(completion)
    }

    fn provider_name(&self) -> &str {
        self.provider.name()
    }
}
