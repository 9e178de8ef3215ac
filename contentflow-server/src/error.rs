//! HTTP error responses.
//!
//! Every failing request answers `{"success": false, "error": ..., "details"?: ...}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contentflow::errors::ContentflowError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Message for failed pipeline runs.
pub const GENERATION_FAILED: &str = "Content generation failed";

/// Message for unknown job ids.
pub const JOB_NOT_FOUND: &str = "Job not found";

/// Errors returned by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An error from the pipeline or the job manager.
    #[error(transparent)]
    Pipeline(#[from] ContentflowError),

    /// The request body was not valid JSON for the endpoint.
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    /// The job id did not parse or is unknown.
    #[error("Job not found")]
    JobNotFound,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidJson(rejection.body_text())
    }
}

/// JSON body of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always false.
    pub success: bool,
    /// Short, client-facing description.
    pub error: String,
    /// Underlying cause, when useful to the client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    fn new(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details,
        }
    }
}

impl ApiError {
    /// Returns the HTTP status and body for this error.
    pub fn parts(&self) -> (StatusCode, ErrorBody) {
        match self {
            Self::InvalidJson(details) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("Invalid JSON body", Some(details.clone())),
            ),
            Self::JobNotFound => (StatusCode::NOT_FOUND, ErrorBody::new(JOB_NOT_FOUND, None)),
            Self::Pipeline(err) => match err {
                ContentflowError::InvalidInput(msg) => {
                    (StatusCode::BAD_REQUEST, ErrorBody::new(msg.clone(), None))
                }
                ContentflowError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, ErrorBody::new(JOB_NOT_FOUND, None))
                }
                ContentflowError::StageFailure { .. } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new(GENERATION_FAILED, Some(err.to_string())),
                ),
                other => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Internal server error", Some(other.to_string())),
                ),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentflow::core::StageName;
    use contentflow::jobs::JobId;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_topic_is_bad_request() {
        let (status, body) = ApiError::from(ContentflowError::topic_required()).parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Topic is required");
        assert!(body.details.is_none());
    }

    #[test]
    fn test_stage_failure_carries_details() {
        let err = ContentflowError::stage_failure(StageName::Writer, "timeout");
        let (status, body) = ApiError::from(err).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, GENERATION_FAILED);
        assert_eq!(body.details.as_deref(), Some("Stage 'writer' failed: timeout"));
    }

    #[test]
    fn test_unknown_job_is_not_found() {
        let (status, body) = ApiError::from(ContentflowError::NotFound(JobId::new())).parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, JOB_NOT_FOUND);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "Job not found"}));
    }
}
