// ABOUTME: Configuration loading and validation for the testsmith server.
// ABOUTME: Reads environment variables once; everything downstream receives explicit values.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use testsmith_agent::{Provider, ProviderSettings, ScriptStyle};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TESTSMITH_BIND is not a valid socket address: {0}")]
    InvalidBind(String),

    #[error("{var} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },

    #[error("{var} names an unknown provider {value:?}; expected groq or openai")]
    UnknownProvider { var: &'static str, value: String },

    #[error("TESTSMITH_SCRIPT_STYLE must be guided or plain, got {0:?}")]
    UnknownScriptStyle(String),
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub home: PathBuf,
    pub bind: SocketAddr,
    pub request_timeout: Duration,
    pub chunk_timeout: Duration,
    pub generator_provider: Provider,
    pub chat_provider: Provider,
    pub generator_model: Option<String>,
    pub chat_model: Option<String>,
    pub script_style: ScriptStyle,
    pub groq: ProviderSettings,
    pub openai: ProviderSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - TESTSMITH_HOME: artifact root (default: ./testsmith-data)
    /// - TESTSMITH_BIND: socket address to bind (default: 127.0.0.1:8000)
    /// - TESTSMITH_REQUEST_TIMEOUT_SECS / TESTSMITH_CHUNK_TIMEOUT_SECS (default: 60)
    /// - TESTSMITH_GENERATOR_PROVIDER (default: groq), TESTSMITH_CHAT_PROVIDER (default: openai)
    /// - TESTSMITH_GENERATOR_MODEL / TESTSMITH_CHAT_MODEL: model overrides (optional)
    /// - TESTSMITH_SCRIPT_STYLE: guided or plain (default: guided)
    /// - GROQ_API_KEY / GROQ_BASE_URL, OPENAI_API_KEY / OPENAI_BASE_URL
    pub fn from_env() -> Result<Self, ConfigError> {
        let home = non_empty_var("TESTSMITH_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./testsmith-data"));

        let bind_str =
            non_empty_var("TESTSMITH_BIND").unwrap_or_else(|| "127.0.0.1:8000".to_string());
        let bind: SocketAddr = bind_str
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_str))?;

        let request_timeout = timeout_var("TESTSMITH_REQUEST_TIMEOUT_SECS")?;
        let chunk_timeout = timeout_var("TESTSMITH_CHUNK_TIMEOUT_SECS")?;

        let generator_provider = provider_var("TESTSMITH_GENERATOR_PROVIDER", Provider::Groq)?;
        let chat_provider = provider_var("TESTSMITH_CHAT_PROVIDER", Provider::OpenAi)?;

        let script_style = match non_empty_var("TESTSMITH_SCRIPT_STYLE") {
            Some(raw) => ScriptStyle::parse(&raw).ok_or(ConfigError::UnknownScriptStyle(raw))?,
            None => ScriptStyle::default(),
        };

        Ok(Self {
            home,
            bind,
            request_timeout,
            chunk_timeout,
            generator_provider,
            chat_provider,
            generator_model: non_empty_var("TESTSMITH_GENERATOR_MODEL"),
            chat_model: non_empty_var("TESTSMITH_CHAT_MODEL"),
            script_style,
            groq: provider_settings(Provider::Groq),
            openai: provider_settings(Provider::OpenAi),
        })
    }

    /// Credentials for `provider`.
    pub fn settings(&self, provider: Provider) -> &ProviderSettings {
        match provider {
            Provider::Groq => &self.groq,
            Provider::OpenAi => &self.openai,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn timeout_var(var: &'static str) -> Result<Duration, ConfigError> {
    let Some(value) = non_empty_var(var) else {
        return Ok(Duration::from_secs(60));
    };
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout { var, value }),
    }
}

fn provider_var(var: &'static str, default: Provider) -> Result<Provider, ConfigError> {
    match non_empty_var(var) {
        Some(value) => Provider::parse(&value).ok_or(ConfigError::UnknownProvider { var, value }),
        None => Ok(default),
    }
}

fn provider_settings(provider: Provider) -> ProviderSettings {
    ProviderSettings {
        api_key: non_empty_var(provider.api_key_var()),
        base_url: non_empty_var(provider.base_url_var()),
    }
}
