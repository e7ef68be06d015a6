//! Error taxonomy for the server.
//!
//! Internal failures stay distinct (configuration vs. launch vs. empty
//! output vs. upstream module failure) so logs can tell them apart, but the
//! HTTP layer collapses everything except caller mistakes into a generic
//! 500 that never leaks tool paths or stderr.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    /// Required tool path, model or module name missing or unresolvable.
    /// Raised before any process is spawned.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The external process could not be started at all.
    #[error("failed to launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process exited but produced none of the output the caller
    /// required. The request payload is persisted for offline inspection
    /// before this is raised.
    #[error("`{command}` produced no output (stderr: {stderr:?})")]
    EmptyOutput {
        command: String,
        stderr: String,
        diagnostic: Option<PathBuf>,
    },

    /// A downstream module wrote to its error channel; the detail is the
    /// module's stderr, verbatim.
    #[error("module `{stage}` failed: {detail}")]
    Upstream { stage: String, detail: String },

    /// The caller supplied no usable payload. Client-facing.
    #[error("{0}")]
    Input(String),

    /// The external process exceeded the configured wall-clock bound and
    /// was terminated.
    #[error("`{command}` did not finish within {seconds}s")]
    Timeout { command: String, seconds: u64 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Response-side wrapper so handlers can `?` a [`ServerError`].
pub struct AppError(pub ServerError);

impl From<ServerError> for AppError {
    fn from(err: ServerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ServerError::Input(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            other => {
                tracing::warn!("request failed: {other:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
