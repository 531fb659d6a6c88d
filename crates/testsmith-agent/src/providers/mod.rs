// ABOUTME: Provider module for the model backends testsmith can talk to.
// ABOUTME: Groq and OpenAI both speak the Chat Completions protocol and share one adapter.

pub mod openai;

use std::fmt;

pub use openai::OpenAiCompatGateway;

/// A named backend preset: default base URL plus the environment variable names that configure it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Groq,
    OpenAi,
}

impl Provider {
    /// Parse a provider name, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "groq" => Some(Provider::Groq),
            "openai" => Some(Provider::OpenAi),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Provider::Groq => "groq",
            Provider::OpenAi => "openai",
        }
    }

    /// Base URL without the `/v1/chat/completions` suffix.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::Groq => "https://api.groq.com/openai",
            Provider::OpenAi => "https://api.openai.com",
        }
    }

    pub fn api_key_var(self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn base_url_var(self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_BASE_URL",
            Provider::OpenAi => "OPENAI_BASE_URL",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
