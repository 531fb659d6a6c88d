// ABOUTME: The error kinds a generation request can fail with, from validation to storage.
// ABOUTME: Routers translate these into the uniform {status, message} result shape in one place.

use thiserror::Error;

/// Everything that can go wrong between receiving a request and returning an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The request is malformed or its text is not worth a model call.
    #[error("{0}")]
    Validation(String),

    /// The request asks for something this build does not support (e.g. a script language).
    #[error("{0}")]
    UnsupportedConfig(String),

    /// The model backend failed, timed out or answered with garbage.
    #[error("model call failed: {0}")]
    Upstream(String),

    /// Model output could not be parsed into the expected structure.
    #[error("could not parse model output: {0}")]
    Parse(String),

    /// The artifact could not be written to or read from the store.
    #[error("storage error: {0}")]
    Storage(String),
}

impl GenerationError {
    /// Short machine-readable label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Validation(_) => "validation",
            GenerationError::UnsupportedConfig(_) => "unsupported_config",
            GenerationError::Upstream(_) => "upstream",
            GenerationError::Parse(_) => "parse",
            GenerationError::Storage(_) => "storage",
        }
    }
}
