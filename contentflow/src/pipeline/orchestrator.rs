//! Sequential content pipeline.

use super::PipelineState;
use crate::config::{Settings, DEFAULT_AUTHOR};
use crate::core::{
    ContentMetadata, ContentResult, HtmlDocument, MarkdownDocument, ProgressEvent, StageName, StageResult,
};
use crate::errors::{ContentflowError, Result};
use crate::events::ProgressNotifier;
use crate::llm::ChatProvider;
use crate::stages::{GenerationOptions, PromptStage, Stage, StageInput};
use crate::utils::text::is_blank;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Options applying to a whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Sampling parameters for every stage.
    pub generation: GenerationOptions,
    /// Whether the HTML publisher runs.
    pub generate_html: bool,
    /// Author credited in the metadata.
    pub author: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            generation: GenerationOptions::default(),
            generate_html: true,
            author: DEFAULT_AUTHOR.to_string(),
        }
    }
}

impl PipelineOptions {
    /// Derives options from process settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            generation: GenerationOptions::from(&settings.provider),
            generate_html: settings.generate_html,
            author: settings.author.clone(),
        }
    }

    /// Sets whether HTML is rendered.
    #[must_use]
    pub fn with_html(mut self, generate_html: bool) -> Self {
        self.generate_html = generate_html;
        self
    }
}

/// Runs research, writer, editor, SEO, publisher and (optionally) the HTML
/// publisher strictly in sequence, each stage consuming the previous
/// stage's output.
///
/// The pipeline holds no per-run state; one instance serves concurrent runs.
pub struct ContentPipeline {
    provider: Arc<dyn ChatProvider>,
    stages: Vec<Arc<dyn Stage>>,
    options: PipelineOptions,
}

impl fmt::Debug for ContentPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentPipeline")
            .field("provider", &self.provider.name())
            .field("stages", &self.stage_names())
            .field("options", &self.options)
            .finish()
    }
}

impl ContentPipeline {
    /// Creates a pipeline with the built-in prompt stages.
    #[must_use]
    pub fn new(provider: Arc<dyn ChatProvider>, options: PipelineOptions) -> Self {
        let stages = PromptStage::defaults(&options.generation)
            .into_iter()
            .map(|stage| Arc::new(stage) as Arc<dyn Stage>)
            .collect();
        Self::from_parts(provider, stages, options)
    }

    /// Creates a pipeline from process settings.
    #[must_use]
    pub fn from_settings(provider: Arc<dyn ChatProvider>, settings: &Settings) -> Self {
        Self::new(provider, PipelineOptions::from_settings(settings))
    }

    pub(super) fn from_parts(
        provider: Arc<dyn ChatProvider>,
        stages: Vec<Arc<dyn Stage>>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            provider,
            stages,
            options,
        }
    }

    /// Returns the run options.
    #[must_use]
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Returns the configured stages, including a disabled HTML publisher.
    #[must_use]
    pub fn stage_names(&self) -> Vec<StageName> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Returns the stages a run will execute.
    fn active_stages(&self) -> impl Iterator<Item = &Arc<dyn Stage>> {
        let generate_html = self.options.generate_html;
        self.stages
            .iter()
            .filter(move |s| generate_html || s.name() != StageName::HtmlPublisher)
    }

    /// Runs the pipeline for one topic.
    ///
    /// Publishes an `active` event before and a `completed` event after every
    /// stage. Nothing is emitted for a rejected topic, and a failed stage
    /// emits no `completed` event; later stages never run.
    ///
    /// # Errors
    ///
    /// - [`ContentflowError::InvalidInput`] for an empty or blank topic
    ///   (no provider call is made).
    /// - [`ContentflowError::StageFailure`] naming the first failing stage.
    #[instrument(name = "pipeline.run", skip(self, topic, notifier), fields(topic = %topic.trim()))]
    pub async fn run(&self, topic: &str, notifier: &ProgressNotifier) -> Result<ContentResult> {
        if is_blank(topic) {
            return Err(ContentflowError::topic_required());
        }
        let topic = topic.trim();

        info!("Pipeline started");
        let mut state = PipelineState::Idle;
        let mut metadata = ContentMetadata::seed(topic, self.options.author.clone());
        let mut previous = String::new();
        let mut results: Vec<StageResult> = Vec::with_capacity(self.stages.len());
        let mut markdown: Option<String> = None;
        let mut html: Option<HtmlDocument> = None;

        for stage in self.active_stages() {
            let name = stage.name();
            let next = PipelineState::for_stage(name);
            debug!(from = %state, to = %next, "Pipeline transition");
            state = state.transition(next)?;

            notifier.publish(&ProgressEvent::active(name));
            info!(stage = %name, "Stage started");

            let input = StageInput::new(topic, &previous, &metadata);
            let result = match stage.execute(self.provider.as_ref(), &input).await {
                Ok(result) => result,
                Err(err) => return Err(fail_run(&mut state, name, err)),
            };

            metadata.refine(&result.fields);
            match name {
                StageName::Publisher => {
                    metadata.finalize(&result.output, result.ended_at);
                    markdown = Some(result.output.clone());
                }
                StageName::HtmlPublisher => {
                    html = Some(HtmlDocument {
                        content: result.output.clone(),
                    });
                }
                _ => {}
            }

            notifier.publish(&ProgressEvent::completed(name, &result.output));
            info!(stage = %name, duration_ms = result.duration_ms(), "Stage completed");

            previous.clone_from(&result.output);
            results.push(result);
        }

        let state = state.transition(PipelineState::Done)?;
        let content = markdown
            .ok_or_else(|| ContentflowError::Internal("pipeline finished without a publisher stage".to_string()))?;

        info!(
            state = %state,
            slug = %metadata.slug,
            word_count = metadata.word_count,
            html = html.is_some(),
            "Pipeline completed"
        );

        Ok(ContentResult {
            markdown: MarkdownDocument { content, metadata },
            html,
            stages: results,
        })
    }
}

/// Moves a run into `Failed` and returns the error it surfaces.
///
/// Errors other than `StageFailure` are attributed to `stage`.
fn fail_run(state: &mut PipelineState, stage: StageName, err: ContentflowError) -> ContentflowError {
    let err = match err {
        err @ ContentflowError::StageFailure { .. } => err,
        other => ContentflowError::stage_failure(stage, other.to_string()),
    };
    match state.transition(PipelineState::Failed) {
        Ok(failed) => {
            *state = failed;
            error!(stage = %stage, state = %failed, error = %err, "Stage failed");
            err
        }
        Err(illegal) => illegal,
    }
}
