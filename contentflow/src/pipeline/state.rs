//! Run-level state machine.

use crate::core::StageName;
use crate::errors::{ContentflowError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a pipeline run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Not started.
    #[default]
    Idle,
    /// Research stage running.
    Researching,
    /// Writer stage running.
    Writing,
    /// Editor stage running.
    Editing,
    /// SEO stage running.
    Optimizing,
    /// Publisher stage running.
    Publishing,
    /// HTML publisher stage running.
    RenderingHtml,
    /// All stages succeeded.
    Done,
    /// A stage failed.
    Failed,
}

impl PipelineState {
    /// Returns the state entered when `stage` starts.
    #[must_use]
    pub const fn for_stage(stage: StageName) -> Self {
        match stage {
            StageName::Research => Self::Researching,
            StageName::Writer => Self::Writing,
            StageName::Editor => Self::Editing,
            StageName::Seo => Self::Optimizing,
            StageName::Publisher => Self::Publishing,
            StageName::HtmlPublisher => Self::RenderingHtml,
        }
    }

    /// Returns true for `Done` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if `next` is a legal successor of `self`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        use PipelineState::{Done, Editing, Failed, Idle, Optimizing, Publishing, RenderingHtml, Researching, Writing};

        match (self, next) {
            (current, Failed) => !current.is_terminal(),
            (Idle, Researching)
            | (Researching, Writing)
            | (Writing, Editing)
            | (Editing, Optimizing)
            | (Optimizing, Publishing)
            | (Publishing, RenderingHtml | Done)
            | (RenderingHtml, Done) => true,
            _ => false,
        }
    }

    /// Moves to `next`.
    ///
    /// # Errors
    ///
    /// Returns an internal error for an illegal transition.
    pub fn transition(self, next: Self) -> Result<Self> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ContentflowError::Internal(format!(
                "invalid pipeline transition {self} -> {next}"
            )))
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Researching => "researching",
            Self::Writing => "writing",
            Self::Editing => "editing",
            Self::Optimizing => "optimizing",
            Self::Publishing => "publishing",
            Self::RenderingHtml => "rendering_html",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}
