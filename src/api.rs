//! HTTP surface for docsum.
//!
//! This module exposes a compact Axum router:
//!
//! - `POST /summarize` – Multipart upload with a `file` part (the filename decides the format)
//!   and an optional `mode` part (label or slug, defaults to the short summary). Returns the
//!   summary plus chunk counters, including whether trailing chunks were left out.
//! - `GET /modes` – Catalog of summary modes with their labels, slugs, and output budgets.
//! - `GET /metrics` – Summarization counters.
//!
//! The HTTP surface shares the same pipeline as the CLI, so results are identical across
//! interfaces.

use crate::processing::{SummarizeApi, SummarizeError, SummaryMode};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build the HTTP router exposing the summarization API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: SummarizeApi + 'static,
{
    Router::new()
        .route("/summarize", post(summarize_document::<S>))
        .route("/modes", get(list_modes))
        .route("/metrics", get(get_metrics::<S>))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(service)
}

/// Success response for the `POST /summarize` endpoint.
#[derive(Serialize)]
struct SummarizeResponse {
    /// Final summary text.
    summary: String,
    /// Label of the selected mode.
    mode: &'static str,
    /// `markdown` for the topic-wise mode, `text` otherwise.
    format: &'static str,
    /// Number of chunks the document was split into.
    chunk_count: usize,
    /// Number of chunks that were summarized.
    chunks_summarized: usize,
    /// Whether trailing chunks were left out of the summary.
    truncated: bool,
}

/// Summarize an uploaded document.
async fn summarize_document<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Json<SummarizeResponse>, AppError>
where
    S: SummarizeApi,
{
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut mode = SummaryMode::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::BadRequest("file part has no filename".into()))?;
                let bytes = field.bytes().await?;
                upload = Some((file_name, bytes.to_vec()));
            }
            Some("mode") => {
                let value = field.text().await?;
                mode = value
                    .parse::<SummaryMode>()
                    .map_err(|error| AppError::BadRequest(error.to_string()))?;
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| AppError::BadRequest("missing 'file' part".into()))?;
    let outcome = service.summarize(file_name, bytes, mode).await?;

    Ok(Json(SummarizeResponse {
        truncated: outcome.truncated(),
        format: if outcome.mode.is_markdown() {
            "markdown"
        } else {
            "text"
        },
        mode: outcome.mode.label(),
        chunk_count: outcome.chunk_count,
        chunks_summarized: outcome.chunks_summarized,
        summary: outcome.summary,
    }))
}

/// Descriptor for a single entry in the mode catalog.
#[derive(Serialize)]
struct ModeDescriptor {
    label: &'static str,
    slug: &'static str,
    max_tokens: u32,
    markdown: bool,
}

/// Response body for `GET /modes`.
#[derive(Serialize)]
struct ModesResponse {
    modes: Vec<ModeDescriptor>,
}

/// Enumerate the supported summary modes.
async fn list_modes() -> Json<ModesResponse> {
    Json(ModesResponse {
        modes: SummaryMode::ALL
            .into_iter()
            .map(|mode| ModeDescriptor {
                label: mode.label(),
                slug: mode.slug(),
                max_tokens: mode.max_tokens(),
                markdown: mode.is_markdown(),
            })
            .collect(),
    })
}

/// Return the summarization counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<crate::metrics::MetricsSnapshot>
where
    S: SummarizeApi,
{
    Json(service.metrics_snapshot())
}

enum AppError {
    BadRequest(String),
    Summarize(SummarizeError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Summarize(error) if error.is_input_error() => {
                (StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
            }
            Self::Summarize(error) => {
                tracing::error!(error = %error, "Summarization failed");
                (StatusCode::BAD_GATEWAY, error.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<SummarizeError> for AppError {
    fn from(inner: SummarizeError) -> Self {
        Self::Summarize(inner)
    }
}

impl From<MultipartError> for AppError {
    fn from(inner: MultipartError) -> Self {
        Self::BadRequest(inner.body_text())
    }
}
