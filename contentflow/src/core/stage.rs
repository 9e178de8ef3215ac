//! Stage name and progress status enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of the fixed content pipeline.
///
/// The declaration order is the execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageName {
    /// Gathers facts, subtopics and keywords for the topic.
    Research,
    /// Drafts the article from the research notes.
    Writer,
    /// Tightens and corrects the draft.
    Editor,
    /// Optimizes the article for search and extracts SEO metadata.
    Seo,
    /// Produces the final publishable markdown.
    Publisher,
    /// Renders the published markdown as a standalone HTML document.
    HtmlPublisher,
}

impl StageName {
    /// All stages in execution order.
    pub const ALL: [Self; 6] = [
        Self::Research,
        Self::Writer,
        Self::Editor,
        Self::Seo,
        Self::Publisher,
        Self::HtmlPublisher,
    ];

    /// Returns the wire name of the stage (e.g. `"html-publisher"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Writer => "writer",
            Self::Editor => "editor",
            Self::Seo => "seo",
            Self::Publisher => "publisher",
            Self::HtmlPublisher => "html-publisher",
        }
    }

    /// Looks a stage up by its wire name.
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| stage.as_str() == name)
    }

    /// Returns a human-readable label used in progress messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Research => "Research",
            Self::Writer => "Writing",
            Self::Editor => "Editing",
            Self::Seo => "SEO optimization",
            Self::Publisher => "Publishing",
            Self::HtmlPublisher => "HTML rendering",
        }
    }

    /// Returns the zero-based position of the stage in the pipeline.
    #[must_use]
    pub fn position(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The progress status of a stage as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    /// Stage has not started yet.
    Pending,
    /// Stage is currently running.
    Active,
    /// Stage finished successfully.
    Completed,
}

impl Default for ProgressStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_name_display() {
        assert_eq!(StageName::Research.to_string(), "research");
        assert_eq!(StageName::Seo.to_string(), "seo");
        assert_eq!(StageName::HtmlPublisher.to_string(), "html-publisher");
    }

    #[test]
    fn test_stage_order_matches_declaration() {
        let mut sorted = StageName::ALL;
        sorted.sort();
        assert_eq!(sorted, StageName::ALL);
        assert_eq!(StageName::Research.position(), 0);
        assert_eq!(StageName::HtmlPublisher.position(), 5);
    }

    #[test]
    fn test_stage_name_serialize() {
        let json = serde_json::to_string(&StageName::HtmlPublisher).unwrap();
        assert_eq!(json, r#""html-publisher""#);

        let parsed: StageName = serde_json::from_str(r#""writer""#).unwrap();
        assert_eq!(parsed, StageName::Writer);
        assert_eq!(StageName::from_wire("html-publisher"), Some(StageName::HtmlPublisher));
        assert_eq!(StageName::from_wire("unknown"), None);
    }

    #[test]
    fn test_progress_status_serialize() {
        assert_eq!(serde_json::to_string(&ProgressStatus::Active).unwrap(), r#""active""#);
        assert_eq!(ProgressStatus::default(), ProgressStatus::Pending);
        assert_eq!(ProgressStatus::Completed.to_string(), "completed");
    }
}
