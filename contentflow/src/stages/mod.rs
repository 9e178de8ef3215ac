//! Pipeline stages.
//!
//! Every built-in stage is a [`PromptStage`]: one chat completion driven by a
//! [`StageConfig`] (prompt pair plus [`OutputParser`]). The [`Stage`] trait is
//! the seam the pipeline runs against, so custom stages can be slotted in.

mod parsers;
mod prompt_stage;
mod prompts;

pub use parsers::{
    ensure_html_document, escape_html, extract_keywords, split_keywords, strip_code_fence, OutputParser,
    ParsedOutput, MAX_KEYWORDS,
};
pub use prompt_stage::{render_template, GenerationOptions, PromptStage, StageConfig};

use crate::core::{ContentMetadata, StageName, StageResult};
use crate::errors::Result;
use crate::llm::ChatProvider;
use async_trait::async_trait;
use std::fmt::Debug;

/// What a stage sees of the run so far.
#[derive(Debug, Clone, Copy)]
pub struct StageInput<'a> {
    /// The trimmed topic.
    pub topic: &'a str,
    /// Output of the previous stage (empty for the first stage).
    pub previous: &'a str,
    /// Metadata accumulated so far.
    pub metadata: &'a ContentMetadata,
}

impl<'a> StageInput<'a> {
    /// Creates a stage input.
    #[must_use]
    pub fn new(topic: &'a str, previous: &'a str, metadata: &'a ContentMetadata) -> Self {
        Self {
            topic,
            previous,
            metadata,
        }
    }
}

/// Trait for pipeline stages.
///
/// A stage consumes the previous stage's output and produces exactly one
/// [`StageResult`], or fails with a stage failure naming itself.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the stage's identity.
    fn name(&self) -> StageName;

    /// Executes the stage.
    async fn execute(&self, provider: &dyn ChatProvider, input: &StageInput<'_>) -> Result<StageResult>;
}
