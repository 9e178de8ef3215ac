//! Content metadata built up over a pipeline run.

use super::StageFields;
use crate::utils::text::{reading_time_minutes, slugify, word_count};
use crate::utils::Timestamp;
use serde::{Deserialize, Serialize};

/// Metadata describing a generated article.
///
/// Seeded from the topic, refined by the research and SEO stages and
/// finalized by the publisher stage. The title always stays the topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetadata {
    /// Article title (the trimmed topic).
    pub title: String,
    /// URL slug.
    pub slug: String,
    /// Meta description.
    #[serde(default)]
    pub description: String,
    /// Target keywords.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Search-engine title suggested by the SEO stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_title: Option<String>,
    /// Publication time, set by the publisher stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<Timestamp>,
    /// Word count of the published markdown.
    #[serde(default)]
    pub word_count: usize,
    /// Estimated reading time in minutes.
    #[serde(default)]
    pub reading_time: usize,
    /// Author credited on the article.
    pub author: String,
}

impl ContentMetadata {
    /// Seeds metadata from a topic.
    #[must_use]
    pub fn seed(topic: &str, author: impl Into<String>) -> Self {
        let title = topic.trim().to_string();
        Self {
            slug: slugify(&title),
            title,
            description: String::new(),
            keywords: Vec::new(),
            seo_title: None,
            published_at: None,
            word_count: 0,
            reading_time: 0,
            author: author.into(),
        }
    }

    /// Folds the structured fields extracted by a stage into the metadata.
    ///
    /// Empty fields leave the current values untouched.
    pub fn refine(&mut self, fields: &StageFields) {
        if !fields.keywords.is_empty() {
            self.keywords.clone_from(&fields.keywords);
        }
        if let Some(slug) = fields.slug.as_deref().map(slugify).filter(|s| !s.is_empty()) {
            self.slug = slug;
        }
        if let Some(description) = fields.description.as_ref().filter(|d| !d.is_empty()) {
            self.description.clone_from(description);
        }
        if let Some(seo_title) = fields.seo_title.as_ref().filter(|t| !t.is_empty()) {
            self.seo_title = Some(seo_title.clone());
        }
    }

    /// Stamps publication time and text statistics for the final article.
    pub fn finalize(&mut self, published_markdown: &str, published_at: Timestamp) {
        self.word_count = word_count(published_markdown);
        self.reading_time = reading_time_minutes(self.word_count);
        self.published_at = Some(published_at);
    }

    /// Returns true once the publisher stage has stamped the metadata.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.published_at.is_some()
    }
}
