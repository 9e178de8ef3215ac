//! Progress event type relayed to live clients.

use super::{ProgressStatus, StageName};
use crate::utils::text::excerpt;
use serde::{Deserialize, Serialize};

/// Maximum number of characters of stage output carried by an event.
pub const OUTPUT_EXCERPT_CHARS: usize = 300;

/// A stage-transition notification.
///
/// Events exist only on the notification bus; they are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// The stage the event refers to.
    pub agent: StageName,

    /// The stage's new status.
    pub status: ProgressStatus,

    /// Human-readable description of the transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Excerpt of the stage output (completed events only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// When the event occurred (ISO 8601).
    pub timestamp: String,
}

impl ProgressEvent {
    /// Creates a new progress event.
    #[must_use]
    pub fn new(agent: StageName, status: ProgressStatus) -> Self {
        Self {
            agent,
            status,
            message: None,
            output: None,
            timestamp: crate::utils::iso_timestamp(),
        }
    }

    /// Sets the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the output excerpt, truncating to [`OUTPUT_EXCERPT_CHARS`].
    #[must_use]
    pub fn with_output(mut self, output: &str) -> Self {
        self.output = Some(excerpt(output, OUTPUT_EXCERPT_CHARS));
        self
    }

    /// Creates an "active" event emitted right before a stage starts.
    #[must_use]
    pub fn active(agent: StageName) -> Self {
        Self::new(agent, ProgressStatus::Active)
            .with_message(format!("{} in progress...", agent.label()))
    }

    /// Creates a "completed" event emitted right after a stage finishes.
    #[must_use]
    pub fn completed(agent: StageName, output: &str) -> Self {
        Self::new(agent, ProgressStatus::Completed)
            .with_message(format!("{} completed", agent.label()))
            .with_output(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_event() {
        let event = ProgressEvent::active(StageName::Writer);
        assert_eq!(event.agent, StageName::Writer);
        assert_eq!(event.status, ProgressStatus::Active);
        assert_eq!(event.message.as_deref(), Some("Writing in progress..."));
        assert!(event.output.is_none());
    }

    #[test]
    fn test_completed_event_truncates_output() {
        let long = "a".repeat(OUTPUT_EXCERPT_CHARS * 2);
        let event = ProgressEvent::completed(StageName::Research, &long);
        let output = event.output.unwrap();
        assert!(output.chars().count() <= OUTPUT_EXCERPT_CHARS + 3);
        assert!(output.ends_with("..."));
    }

    #[test]
    fn test_event_wire_shape() {
        let event = ProgressEvent::active(StageName::Seo);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["agent"], "seo");
        assert_eq!(value["status"], "active");
        assert!(value.get("output").is_none());
    }
}
