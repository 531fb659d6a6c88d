// ABOUTME: Shared application state for the testsmith HTTP server.
// ABOUTME: Holds the request router, chunk aggregator and artifact store, built once from ServerConfig.

use std::sync::Arc;
use std::time::Duration;

use testsmith_agent::{
    AgentRouter, ChunkAggregator, GatewayError, RouterOptions, create_gateway,
};
use testsmith_core::{PlausibilityPolicy, TokenCounter, TokenizerError};
use testsmith_store::{ArtifactStore, StoreError};
use thiserror::Error;

use crate::config::ServerConfig;

/// Failures while wiring the server together at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("artifact store: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),

    #[error("model gateway: {0}")]
    Gateway(#[from] GatewayError),
}

/// Shared application state accessible by all Axum handlers.
pub struct AppState {
    pub router: Arc<AgentRouter>,
    pub aggregator: ChunkAggregator,
    pub store: ArtifactStore,
    /// Wall-clock limit for a single non-chunked generation.
    pub request_timeout: Duration,
}

/// Type alias for the Arc-wrapped state used with Axum's State extractor.
pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        router: Arc<AgentRouter>,
        store: ArtifactStore,
        request_timeout: Duration,
        chunk_timeout: Duration,
    ) -> Self {
        let aggregator = ChunkAggregator::new(router.clone(), store.clone(), chunk_timeout);
        Self {
            router,
            aggregator,
            store,
            request_timeout,
        }
    }

    /// Open the store, load the tokenizer and connect both gateways.
    ///
    /// Fails fast when a configured provider has no API key.
    pub fn from_config(config: &ServerConfig) -> Result<Self, StartupError> {
        let store = ArtifactStore::new(&config.home)?;
        let counter = TokenCounter::cl100k()?;

        let generator_gateway = create_gateway(
            config.generator_provider,
            config.settings(config.generator_provider),
        )?;
        let chat_gateway =
            create_gateway(config.chat_provider, config.settings(config.chat_provider))?;

        let router = AgentRouter::with_gateways(
            generator_gateway,
            chat_gateway,
            store.clone(),
            counter,
            RouterOptions {
                generator_model: config.generator_model.clone(),
                chat_model: config.chat_model.clone(),
                script_style: config.script_style,
                policy: PlausibilityPolicy::default(),
            },
        );
        tracing::info!(
            home = %config.home.display(),
            generator = %config.generator_provider,
            chat = %config.chat_provider,
            script_style = config.script_style.name(),
            "application state ready"
        );

        Ok(Self::new(
            Arc::new(router),
            store,
            config.request_timeout,
            config.chunk_timeout,
        ))
    }
}

#[cfg(test)]
impl AppState {
    /// State over one test gateway and a store rooted at `home`.
    pub(crate) fn for_tests(
        gateway: Arc<dyn testsmith_agent::ModelGateway>,
        home: &std::path::Path,
        request_timeout: Duration,
    ) -> SharedState {
        let store = ArtifactStore::new(home).unwrap();
        let router = AgentRouter::with_gateways(
            gateway.clone(),
            gateway,
            store.clone(),
            TokenCounter::cl100k().unwrap(),
            RouterOptions::default(),
        );
        Arc::new(Self::new(
            Arc::new(router),
            store,
            request_timeout,
            Duration::from_secs(60),
        ))
    }
}
