//! Jobs mode: accept now, poll for the result later.

use super::require_topic;
use crate::error::ApiError;
use crate::state::SharedState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use contentflow::jobs::{Job, JobId, JobStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Advertised run time of one job.
pub const ESTIMATED_TIME: &str = "2-3 minutes";

/// Body of `POST /api/workflow` in jobs mode.
#[derive(Debug, Default, Deserialize)]
pub struct JobRequest {
    /// The topic to write about.
    #[serde(default)]
    pub topic: Option<String>,
}

/// `202 Accepted` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobAccepted {
    /// Always true.
    pub success: bool,
    /// Id to poll with.
    pub job_id: JobId,
    /// Always `processing`.
    pub status: JobStatus,
    /// Rough completion estimate.
    pub estimated_time: &'static str,
}

/// `POST /api/workflow` (jobs mode)
pub async fn submit_job(
    State(state): State<SharedState>,
    payload: Result<Json<JobRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<JobAccepted>), ApiError> {
    let Json(request) = payload?;
    let topic = require_topic(request.topic)?;

    let job_id = state.jobs.start(&topic, Arc::clone(&state.pipeline)).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(JobAccepted {
            success: true,
            job_id,
            status: JobStatus::Processing,
            estimated_time: ESTIMATED_TIME,
        }),
    ))
}

/// `GET /api/status/:job_id`
pub async fn job_status(
    State(state): State<SharedState>,
    Path(job_id): Path<String>,
) -> Result<Json<Job>, ApiError> {
    let id: JobId = job_id.parse().map_err(|_| ApiError::JobNotFound)?;
    Ok(Json(state.jobs.get(&id).await?))
}
