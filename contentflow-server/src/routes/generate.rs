//! Synchronous generation: one request, one complete article.

use super::require_topic;
use crate::error::ApiError;
use crate::state::SharedState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use contentflow::core::{ContentMetadata, ProgressEvent};
use contentflow::events::{CollectingSink, LoggingSink, ProgressNotifier};
use contentflow::output::{save_content, SavedFiles};
use contentflow::utils::iso_timestamp;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of `POST /api/generate`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// The topic to write about.
    #[serde(default)]
    pub topic: Option<String>,
    /// Also write the article into the output directory.
    #[serde(default)]
    pub save_to_file: bool,
}

/// Successful response of `POST /api/generate`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// Always true.
    pub success: bool,
    /// Published markdown.
    pub markdown: String,
    /// Rendered HTML, when enabled.
    pub html: Option<String>,
    /// Final article metadata.
    pub metadata: ContentMetadata,
    /// When the response was produced.
    pub generated_at: String,
    /// Every progress event of the run, in order.
    pub progress: Vec<ProgressEvent>,
    /// Written files, when `saveToFile` was set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_files: Option<SavedFiles>,
}

/// `POST /api/generate`
///
/// Holds the connection for the whole run; there is no timeout beyond the
/// provider's per-request one. In jobs mode this is the legacy synchronous
/// endpoint and long runs can outlive the host's execution limit.
pub async fn generate(
    State(state): State<SharedState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload?;
    let topic = require_topic(request.topic)?;

    let progress = Arc::new(CollectingSink::new());
    let notifier = ProgressNotifier::with_sink(progress.clone());
    notifier.subscribe(Arc::new(LoggingSink::debug()));

    let result = state.pipeline.run(&topic, &notifier).await?;

    let saved_files = if request.save_to_file {
        Some(save_content(&state.output_dir, &result).await?)
    } else {
        None
    };

    Ok(Json(GenerateResponse {
        success: true,
        html: result.html_content().map(str::to_string),
        metadata: result.metadata().clone(),
        markdown: result.markdown.content,
        generated_at: iso_timestamp(),
        progress: progress.take(),
        saved_files,
    }))
}
