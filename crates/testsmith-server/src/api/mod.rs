// ABOUTME: API module containing HTTP handler submodules.
// ABOUTME: Generation and download handlers share the {status, message} error body.

pub mod download;
pub mod generate;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// `{status: "error", message}` with the given status code.
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "status": "error", "message": message.into() })),
    )
        .into_response()
}
