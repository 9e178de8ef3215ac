//! The prompt-driven stage used for every built-in step.

use super::parsers::OutputParser;
use super::prompts;
use super::{Stage, StageInput};
use crate::config::ProviderSettings;
use crate::core::{StageName, StageResult};
use crate::errors::{ContentflowError, Result};
use crate::llm::{ChatProvider, ChatRequest};
use crate::utils::now_utc;
use async_trait::async_trait;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, warn};

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(topic|previous|keywords|title|description)\}").expect("valid regex"));

/// Sampling parameters shared by all stages of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion token cap.
    pub max_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 4000,
        }
    }
}

impl From<&ProviderSettings> for GenerationOptions {
    fn from(settings: &ProviderSettings) -> Self {
        Self {
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

/// Declarative description of one prompt stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Stage identity.
    pub name: StageName,
    /// System prompt.
    pub system_prompt: String,
    /// User prompt template; see [`render_template`].
    pub user_template: String,
    /// How the response is interpreted.
    pub parser: OutputParser,
}

impl StageConfig {
    /// Creates a stage config.
    #[must_use]
    pub fn new(
        name: StageName,
        system_prompt: impl Into<String>,
        user_template: impl Into<String>,
        parser: OutputParser,
    ) -> Self {
        Self {
            name,
            system_prompt: system_prompt.into(),
            user_template: user_template.into(),
            parser,
        }
    }

    /// Returns the built-in config for a stage.
    #[must_use]
    pub fn for_stage(name: StageName) -> Self {
        match name {
            StageName::Research => Self::new(
                name,
                prompts::RESEARCH_SYSTEM,
                prompts::RESEARCH_USER,
                OutputParser::Research,
            ),
            StageName::Writer => Self::new(name, prompts::WRITER_SYSTEM, prompts::WRITER_USER, OutputParser::Markdown),
            StageName::Editor => Self::new(name, prompts::EDITOR_SYSTEM, prompts::EDITOR_USER, OutputParser::Markdown),
            StageName::Seo => Self::new(name, prompts::SEO_SYSTEM, prompts::SEO_USER, OutputParser::Seo),
            StageName::Publisher => Self::new(
                name,
                prompts::PUBLISHER_SYSTEM,
                prompts::PUBLISHER_USER,
                OutputParser::Markdown,
            ),
            StageName::HtmlPublisher => Self::new(name, prompts::HTML_SYSTEM, prompts::HTML_USER, OutputParser::Html),
        }
    }

    /// Returns the built-in configs for all six stages, in execution order.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        StageName::ALL.into_iter().map(Self::for_stage).collect()
    }
}

/// Substitutes `{topic}`, `{previous}`, `{keywords}`, `{title}` and
/// `{description}` in a single pass.
///
/// Substituted text is never re-scanned, so a previous output that happens to
/// contain `{topic}` is passed through verbatim.
#[must_use]
pub fn render_template(template: &str, input: &StageInput<'_>) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
            "topic" => input.topic.to_string(),
            "previous" => input.previous.to_string(),
            "keywords" if input.metadata.keywords.is_empty() => input.topic.to_string(),
            "keywords" => input.metadata.keywords.join(", "),
            "title" => input.metadata.title.clone(),
            _ => input.metadata.description.clone(),
        })
        .into_owned()
}

/// A stage that runs one chat completion and parses the reply.
#[derive(Debug, Clone)]
pub struct PromptStage {
    config: StageConfig,
    options: GenerationOptions,
}

impl PromptStage {
    /// Creates a prompt stage.
    #[must_use]
    pub fn new(config: StageConfig, options: GenerationOptions) -> Self {
        Self { config, options }
    }

    /// Creates the built-in stages, in execution order.
    #[must_use]
    pub fn defaults(options: &GenerationOptions) -> Vec<Self> {
        StageConfig::defaults()
            .into_iter()
            .map(|config| Self::new(config, options.clone()))
            .collect()
    }

    /// Returns the stage config.
    #[must_use]
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Builds the chat request for an input.
    #[must_use]
    pub fn request(&self, input: &StageInput<'_>) -> ChatRequest {
        ChatRequest::new(
            self.options.model.clone(),
            self.config.system_prompt.clone(),
            render_template(&self.config.user_template, input),
        )
        .with_temperature(self.options.temperature)
        .with_max_tokens(self.options.max_tokens)
        .with_label(self.config.name.as_str())
    }
}

#[async_trait]
impl Stage for PromptStage {
    fn name(&self) -> StageName {
        self.config.name
    }

    async fn execute(&self, provider: &dyn ChatProvider, input: &StageInput<'_>) -> Result<StageResult> {
        let stage = self.config.name;
        let started_at = now_utc();
        let request = self.request(input);

        let response = provider.complete(&request).await.map_err(|err| {
            warn!(stage = %stage, provider = provider.name(), error = %err, "Provider call failed");
            ContentflowError::stage_failure(stage, err.to_string())
        })?;
        debug!(stage = %stage, attributes = ?response.to_log_attributes(), "Stage response received");

        let parsed = self
            .config
            .parser
            .parse(&response.content, input.metadata)
            .map_err(|cause| ContentflowError::stage_failure(stage, cause))?;

        Ok(StageResult {
            stage,
            output: parsed.text,
            fields: parsed.fields,
            started_at,
            ended_at: now_utc(),
        })
    }
}
