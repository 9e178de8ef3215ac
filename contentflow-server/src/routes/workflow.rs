//! Live-mode workflow start; progress goes to the caller's WebSocket session.

use super::require_topic;
use crate::error::ApiError;
use crate::state::SharedState;
use crate::ws::run_workflow;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Body of `POST /api/workflow` in live mode.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRequest {
    /// The topic to write about.
    #[serde(default)]
    pub topic: Option<String>,
    /// WebSocket session that receives the progress stream.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Acknowledgement returned once the run is spawned.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStarted {
    /// Always true.
    pub success: bool,
    /// Human-readable notice.
    pub message: String,
    /// Echo of the requested session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// `POST /api/workflow` (live mode)
pub async fn start_workflow(
    State(state): State<SharedState>,
    payload: Result<Json<WorkflowRequest>, JsonRejection>,
) -> Result<Json<WorkflowStarted>, ApiError> {
    let Json(request) = payload?;
    let topic = require_topic(request.topic)?;

    let session = match &request.session_id {
        Some(id) => {
            let tx = state.sessions.get(id).await;
            if tx.is_none() {
                warn!(session_id = %id, "Session not connected; progress will not be streamed");
            }
            tx
        }
        None => None,
    };

    info!(topic = %topic, session_id = ?request.session_id, "Workflow started");
    tokio::spawn(run_workflow(Arc::clone(&state.pipeline), topic, session));

    Ok(Json(WorkflowStarted {
        success: true,
        message: "Workflow started".to_string(),
        session_id: request.session_id,
    }))
}
