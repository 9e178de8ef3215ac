//! Error types for the contentflow crate.
//!
//! [`ContentflowError`] is the taxonomy surfaced by the orchestrator and the
//! job manager. Component-level errors ([`ProviderError`](crate::llm::ProviderError),
//! [`JobStoreError`](crate::jobs::JobStoreError), [`ConfigError`](crate::config::ConfigError))
//! live next to their components and convert into it.

use crate::core::StageName;
use crate::jobs::{JobId, JobStoreError};
use thiserror::Error;

/// Message used when a run is requested without a usable topic.
pub const TOPIC_REQUIRED: &str = "Topic is required";

/// The main error type for contentflow operations.
#[derive(Debug, Error)]
pub enum ContentflowError {
    /// The request was rejected before any remote call (e.g. blank topic).
    #[error("{0}")]
    InvalidInput(String),

    /// A stage's remote call failed or returned unusable output.
    #[error("Stage '{stage}' failed: {cause}")]
    StageFailure {
        /// The stage that failed.
        stage: StageName,
        /// Description of the underlying failure.
        cause: String,
    },

    /// No job exists with the given identifier.
    #[error("Job not found: {0}")]
    NotFound(JobId),

    /// A terminal write was attempted on a job that already reached a terminal state.
    #[error("Job {0} already reached a terminal state")]
    JobAlreadyTerminal(JobId),

    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The job store failed.
    #[error("{0}")]
    Storage(#[from] JobStoreError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ContentflowError {
    /// Creates the error returned for an empty or whitespace-only topic.
    #[must_use]
    pub fn topic_required() -> Self {
        Self::InvalidInput(TOPIC_REQUIRED.to_string())
    }

    /// Creates a stage failure.
    #[must_use]
    pub fn stage_failure(stage: StageName, cause: impl Into<String>) -> Self {
        Self::StageFailure {
            stage,
            cause: cause.into(),
        }
    }

    /// Returns the failing stage, if this is a stage failure.
    #[must_use]
    pub fn failed_stage(&self) -> Option<StageName> {
        match self {
            Self::StageFailure { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Returns true if the error was caused by the caller's input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::NotFound(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = ContentflowError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_required_message() {
        let err = ContentflowError::topic_required();
        assert_eq!(err.to_string(), "Topic is required");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_stage_failure_display() {
        let err = ContentflowError::stage_failure(StageName::Seo, "rate limited");
        assert_eq!(err.to_string(), "Stage 'seo' failed: rate limited");
        assert_eq!(err.failed_stage(), Some(StageName::Seo));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_not_found_is_client_error() {
        let err = ContentflowError::NotFound(JobId::new());
        assert!(err.is_client_error());
        assert!(err.failed_stage().is_none());
    }
}
