// ABOUTME: GET /download/{filename}: serves a stored artifact as an attachment.
// ABOUTME: Searches features, then test cases, then scripts; the media type follows the extension.

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::api::error_response;
use crate::app_state::SharedState;

/// GET /download/{filename}
pub async fn download(
    State(state): State<SharedState>,
    Path(filename): Path<String>,
) -> Response {
    let Some(path) = state.store.find(&filename) else {
        tracing::debug!(file = %filename, "download of unknown artifact");
        return error_response(StatusCode::NOT_FOUND, format!("File not found: {filename}"));
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, media_type(&filename).to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename.replace('"', "")),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "failed to read artifact");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Could not read {filename}"),
            )
        }
    }
}

fn media_type(filename: &str) -> &'static str {
    if filename.ends_with(".csv") {
        "text/csv"
    } else if filename.ends_with(".py") {
        "text/x-python"
    } else {
        "text/plain"
    }
}
