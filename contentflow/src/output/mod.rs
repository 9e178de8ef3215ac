//! Writing generated content to disk.
//!
//! Each run produces `{slug}-{YYYY-MM-DD}.md` (with front matter) and, when
//! HTML was rendered, a sibling `.html` file.

use crate::core::{ContentMetadata, ContentResult};
use crate::errors::Result;
use crate::utils::{date_stamp, format_iso8601, now_utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Paths written by [`save_content`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFiles {
    /// The markdown file.
    pub markdown: PathBuf,
    /// The HTML file, if HTML was rendered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<PathBuf>,
}

/// Returns the file stem used for a result (`{slug}-{date}`).
#[must_use]
pub fn file_stem(metadata: &ContentMetadata) -> String {
    let date = date_stamp(&metadata.published_at.unwrap_or_else(now_utc));
    let slug = if metadata.slug.is_empty() { "article" } else { metadata.slug.as_str() };
    format!("{slug}-{date}")
}

/// Renders the YAML front matter block for an article.
#[must_use]
pub fn front_matter(metadata: &ContentMetadata) -> String {
    // JSON strings are valid YAML scalars and take care of quoting.
    let quote = |s: &str| serde_json::Value::from(s).to_string();

    let mut lines = vec![
        "---".to_string(),
        format!("title: {}", quote(&metadata.title)),
        format!("slug: {}", quote(&metadata.slug)),
        format!("description: {}", quote(&metadata.description)),
        format!("keywords: {}", serde_json::Value::from(metadata.keywords.clone())),
        format!("author: {}", quote(&metadata.author)),
    ];
    if let Some(seo_title) = &metadata.seo_title {
        lines.push(format!("seoTitle: {}", quote(seo_title)));
    }
    if let Some(published_at) = &metadata.published_at {
        lines.push(format!("publishedAt: {}", quote(&format_iso8601(published_at))));
    }
    lines.push(format!("wordCount: {}", metadata.word_count));
    lines.push(format!("readingTime: {}", metadata.reading_time));
    lines.push("---".to_string());
    lines.join("\n")
}

/// Writes a result's markdown (and HTML, if present) into `dir`.
///
/// The directory is created if missing; existing files with the same name
/// are overwritten.
///
/// # Errors
///
/// Returns an I/O error if the directory or a file cannot be written.
pub async fn save_content(dir: &Path, result: &ContentResult) -> Result<SavedFiles> {
    tokio::fs::create_dir_all(dir).await?;

    let metadata = result.metadata();
    let stem = file_stem(metadata);

    let markdown = dir.join(format!("{stem}.md"));
    let body = format!("{}\n\n{}\n", front_matter(metadata), result.markdown.content.trim_end());
    tokio::fs::write(&markdown, body).await?;

    let html = match result.html_content() {
        Some(content) => {
            let path = dir.join(format!("{stem}.html"));
            tokio::fs::write(&path, content).await?;
            Some(path)
        }
        None => None,
    };

    info!(markdown = %markdown.display(), html = ?html, "Content saved");
    Ok(SavedFiles { markdown, html })
}
