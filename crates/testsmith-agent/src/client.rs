// ABOUTME: Factory for model gateways from a provider preset plus explicit settings.
// ABOUTME: Construction either yields a working gateway or a typed error; there is no half-initialized state.

use std::sync::Arc;

use crate::gateway::{GatewayError, ModelGateway};
use crate::providers::{OpenAiCompatGateway, Provider};

/// Credentials and endpoint override for one provider, read once by the config layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl ProviderSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Create a gateway for `provider`.
///
/// The base URL comes from the settings when present, else the provider's
/// default. A missing or blank API key is an error.
pub fn create_gateway(
    provider: Provider,
    settings: &ProviderSettings,
) -> Result<Arc<dyn ModelGateway>, GatewayError> {
    let api_key = settings
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            GatewayError::MissingConfig(format!(
                "{} environment variable not set",
                provider.api_key_var()
            ))
        })?;

    let base_url = settings
        .base_url
        .clone()
        .unwrap_or_else(|| provider.default_base_url().to_string());

    tracing::info!(provider = provider.name(), base_url = %base_url, "model gateway configured");
    Ok(Arc::new(OpenAiCompatGateway::new(
        provider,
        api_key.to_string(),
        base_url,
    )))
}
