//! Pipeline builder with validation.

use super::{ContentPipeline, PipelineOptions, PipelineState};
use crate::core::StageName;
use crate::errors::{ContentflowError, Result};
use crate::llm::ChatProvider;
use crate::stages::{PromptStage, Stage};
use std::sync::Arc;

/// Builder for pipelines with custom stage implementations.
///
/// Stages must be added in pipeline order, research first, and the chain must
/// end at the publisher or the HTML publisher.
pub struct PipelineBuilder {
    provider: Arc<dyn ChatProvider>,
    options: PipelineOptions,
    stages: Vec<Arc<dyn Stage>>,
    state: PipelineState,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            provider,
            options: PipelineOptions::default(),
            stages: Vec::new(),
            state: PipelineState::Idle,
        }
    }

    /// Sets the run options.
    #[must_use]
    pub fn options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Appends a stage.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the stage is out of order.
    pub fn stage(mut self, stage: Arc<dyn Stage>) -> Result<Self> {
        let name = stage.name();
        self.state = self
            .state
            .transition(PipelineState::for_stage(name))
            .map_err(|_| ContentflowError::Configuration(format!("Stage '{name}' added out of order")))?;
        self.stages.push(stage);
        Ok(self)
    }

    /// Appends the built-in prompt stages, using the current options.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if stages were already added.
    pub fn default_stages(mut self) -> Result<Self> {
        for stage in PromptStage::defaults(&self.options.generation) {
            self = self.stage(Arc::new(stage))?;
        }
        Ok(self)
    }

    /// Returns the number of stages added so far.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the chain does not reach the publisher.
    pub fn build(self) -> Result<ContentPipeline> {
        if !self.state.can_transition_to(PipelineState::Done) {
            return Err(ContentflowError::Configuration(format!(
                "Pipeline must run through '{}' (stopped at {})",
                StageName::Publisher,
                self.state
            )));
        }
        Ok(ContentPipeline::from_parts(self.provider, self.stages, self.options))
    }
}
