// ABOUTME: Test utilities for testsmith-agent: scripted and closure-driven model gateways.
// ABOUTME: Used in tests to simulate model replies and failures without real API calls.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use testsmith_core::GenerationParams;

use crate::gateway::{Completion, GatewayError, ModelGateway};

/// A recorded gateway call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub params: GenerationParams,
}

/// A gateway that replays a fixed queue of replies in call order.
///
/// Once the queue is drained every further call fails with a provider error,
/// so tests notice unexpected extra calls.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()))
    }

    /// Queue a failure.
    pub fn fail(self, err: GatewayError) -> Self {
        self.push(Err(err))
    }

    fn push(self, reply: Result<String, GatewayError>) -> Self {
        lock(&self.replies).push_back(reply);
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.prompt).collect()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn complete(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Completion, GatewayError> {
        lock(&self.calls).push(RecordedCall {
            prompt: prompt.to_string(),
            params: params.clone(),
        });
        let next = lock(&self.replies).pop_front();
        match next {
            Some(reply) => reply.map(Completion::text),
            None => Err(GatewayError::ProviderError(
                "scripted gateway has no replies left".to_string(),
            )),
        }
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

type ReplyFn = dyn Fn(&str) -> Result<String, GatewayError> + Send + Sync;

/// A gateway whose reply is computed from the prompt.
///
/// Suited to concurrent callers, where a queue's order would be arbitrary.
/// Prompts containing a `slow_on` marker are delayed before replying.
pub struct FnGateway {
    reply: Box<ReplyFn>,
    slow: Option<(String, Duration)>,
}

impl FnGateway {
    pub fn new(reply: impl Fn(&str) -> Result<String, GatewayError> + Send + Sync + 'static) -> Self {
        Self {
            reply: Box::new(reply),
            slow: None,
        }
    }

    /// Delay replies to prompts containing `marker`.
    pub fn slow_on(mut self, marker: impl Into<String>, delay: Duration) -> Self {
        self.slow = Some((marker.into(), delay));
        self
    }
}

#[async_trait]
impl ModelGateway for FnGateway {
    async fn complete(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<Completion, GatewayError> {
        if let Some((marker, delay)) = &self.slow
            && prompt.contains(marker.as_str())
        {
            tokio::time::sleep(*delay).await;
        }
        (self.reply)(prompt).map(Completion::text)
    }

    fn provider_name(&self) -> &str {
        "fn"
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> GenerationParams {
        GenerationParams::new("stub-model", 0.0, 64)
    }

    #[tokio::test]
    async fn scripted_replies_in_order_then_fails() {
        let gateway = ScriptedGateway::new()
            .reply("first")
            .fail(GatewayError::RateLimited);

        let first = gateway.complete("a", &params()).await.unwrap();
        assert_eq!(first.content, "first");
        assert!(matches!(
            gateway.complete("b", &params()).await,
            Err(GatewayError::RateLimited)
        ));
        assert!(gateway.complete("c", &params()).await.is_err());

        assert_eq!(gateway.prompts(), vec!["a", "b", "c"]);
        assert_eq!(gateway.calls()[0].params.model, "stub-model");
    }

    #[tokio::test]
    async fn fn_gateway_computes_reply_from_prompt() {
        let gateway = FnGateway::new(|prompt| {
            if prompt.contains("boom") {
                Err(GatewayError::ProviderError("boom".to_string()))
            } else {
                Ok(prompt.to_uppercase())
            }
        });

        assert_eq!(gateway.complete("hi", &params()).await.unwrap().content, "HI");
        assert!(gateway.complete("boom", &params()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn fn_gateway_delays_marked_prompts() {
        let gateway = FnGateway::new(|p| Ok(p.to_string()))
            .slow_on("slow", Duration::from_secs(30));

        let started = tokio::time::Instant::now();
        gateway.complete("fast", &params()).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(1));
        gateway.complete("slow please", &params()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(30));
    }
}
