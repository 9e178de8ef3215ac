//! Job record types.

use crate::core::ContentResult;
use crate::utils::{generate_uuid, now_utc, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier of an asynchronous job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generates a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(generate_uuid())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// The pipeline run is in flight.
    Processing,
    /// The run succeeded; `result` is set.
    Completed,
    /// The run failed; `error` is set.
    Failed,
}

impl JobStatus {
    /// Returns true for `Completed` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Durable record of one asynchronous pipeline run.
///
/// Written exactly twice: the initial `processing` record and one terminal
/// record that fully replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Job identifier.
    pub job_id: JobId,
    /// The requested topic.
    pub topic: String,
    /// Current status.
    pub status: JobStatus,
    /// Generated content (completed jobs only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ContentResult>,
    /// Failure message (failed jobs only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the job was accepted.
    pub started_at: Timestamp,
    /// When the job completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    /// When the job failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<Timestamp>,
}

impl Job {
    /// Creates the initial record for a new job.
    #[must_use]
    pub fn processing(job_id: JobId, topic: impl Into<String>) -> Self {
        Self {
            job_id,
            topic: topic.into(),
            status: JobStatus::Processing,
            result: None,
            error: None,
            started_at: now_utc(),
            completed_at: None,
            failed_at: None,
        }
    }

    /// Returns the terminal record for a successful run.
    #[must_use]
    pub fn completed(self, result: ContentResult) -> Self {
        Self {
            status: JobStatus::Completed,
            result: Some(result),
            error: None,
            completed_at: Some(now_utc()),
            failed_at: None,
            ..self
        }
    }

    /// Returns the terminal record for a failed run.
    #[must_use]
    pub fn failed(self, error: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            result: None,
            error: Some(error.into()),
            completed_at: None,
            failed_at: Some(now_utc()),
            ..self
        }
    }

    /// Returns true once the job reached a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
