//! Stage and run result types.

use super::{ContentMetadata, StageName};
use crate::utils::Timestamp;
use serde::{Deserialize, Serialize};

/// Structured fields a stage extracted from its response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageFields {
    /// Keywords named by the stage.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Suggested URL slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Suggested meta description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Suggested search-engine title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_title: Option<String>,
}

impl StageFields {
    /// Returns true if no field was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
            && self.slug.is_none()
            && self.description.is_none()
            && self.seo_title.is_none()
    }
}

/// Output of exactly one stage; immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageResult {
    /// The stage that produced this result.
    pub stage: StageName,
    /// Free-text output handed to the next stage.
    pub output: String,
    /// Extracted structured fields.
    #[serde(default)]
    pub fields: StageFields,
    /// When the stage started.
    pub started_at: Timestamp,
    /// When the stage ended.
    pub ended_at: Timestamp,
}

impl StageResult {
    /// Returns the stage duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.ended_at - self.started_at).num_milliseconds()
    }
}

/// The published markdown article and its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkdownDocument {
    /// Markdown body.
    pub content: String,
    /// Final metadata.
    pub metadata: ContentMetadata,
}

/// The rendered HTML document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlDocument {
    /// Complete HTML document starting with `<!DOCTYPE html>`.
    pub content: String,
}

/// Result of a complete pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentResult {
    /// The published article.
    pub markdown: MarkdownDocument,
    /// The rendered HTML, when HTML rendering is enabled.
    #[serde(default)]
    pub html: Option<HtmlDocument>,
    /// Per-stage results in execution order.
    #[serde(skip)]
    pub stages: Vec<StageResult>,
}

impl ContentResult {
    /// Returns the final metadata.
    #[must_use]
    pub fn metadata(&self) -> &ContentMetadata {
        &self.markdown.metadata
    }

    /// Returns the HTML content, if rendered.
    #[must_use]
    pub fn html_content(&self) -> Option<&str> {
        self.html.as_ref().map(|h| h.content.as_str())
    }

    /// Returns the result produced by a given stage.
    #[must_use]
    pub fn stage(&self, name: StageName) -> Option<&StageResult> {
        self.stages.iter().find(|s| s.stage == name)
    }
}
