// ABOUTME: HTTP server for testsmith: generation requests, chunked generation and artifact downloads.
// ABOUTME: Uses Axum with shared state built once from environment configuration.

pub mod api;
pub mod app_state;
pub mod config;
pub mod routes;

pub use app_state::{AppState, SharedState, StartupError};
pub use config::{ConfigError, ServerConfig};
pub use routes::create_router;
