// ABOUTME: Model-facing half of testsmith: the gateway seam, artifact generators, router and chunk aggregator.
// ABOUTME: Generators talk to models only through ModelGateway, so tests drive them with scripted gateways.

pub mod aggregator;
pub mod client;
pub mod gateway;
pub mod generators;
pub mod prompts;
pub mod providers;
pub mod router;
pub mod testing;

pub use aggregator::{AggregateError, ChunkAggregator, DEFAULT_CHUNK_TIMEOUT};
pub use client::{ProviderSettings, create_gateway};
pub use gateway::{Completion, GatewayError, ModelGateway};
pub use generators::{ChatGenerator, FeatureGenerator, ScriptGenerator, ScriptStyle, TestCaseGenerator};
pub use providers::Provider;
pub use router::{AgentRouter, RouterOptions};
