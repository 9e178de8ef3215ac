//! Canned stage responses and pipeline fixtures.

use crate::core::StageName;
use crate::llm::ChatProvider;
use crate::pipeline::{ContentPipeline, PipelineOptions};
use crate::stages::GenerationOptions;
use std::sync::Arc;

/// Author used by fixture pipelines.
pub const TEST_AUTHOR: &str = "Test Author";

/// Research notes ending in a `KEYWORDS:` line.
pub const RESEARCH_RESPONSE: &str = "[research] Overview of the topic with key facts.\n\n\
- Fact one\n- Fact two\n\nKEYWORDS: primary keyword, secondary keyword, long tail keyword";

/// Draft article.
pub const WRITER_RESPONSE: &str = "[writer] # Draft\n\nIntroduction paragraph.\n\n## Section\n\nBody text.";

/// Edited article.
pub const EDITOR_RESPONSE: &str = "[editor] # Draft\n\nA cleaner introduction.\n\n## Section\n\nTighter body text.";

/// SEO-optimized article with a metadata block (no slug, so the topic slug stays).
pub const SEO_RESPONSE: &str = "[seo] # Optimized Draft\n\nKeyword-rich introduction.\n\n## Section\n\nBody.\n\n\
---SEO---\nTITLE: Optimized Title\nMETA_DESCRIPTION: A concise summary for search results.\n\
KEYWORDS: primary keyword, secondary keyword";

/// Final markdown.
pub const PUBLISHER_RESPONSE: &str = "[publisher] # Final Article\n\nPolished introduction that hooks the reader.\n\n\
## Section\n\nFinal body text with a clear point.\n\n## Conclusion\n\nRead more and share.";

/// Complete HTML document.
pub const HTML_RESPONSE: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head><title>Final Article</title></head>\n\
<body><article><h1>Final Article</h1><p>[html-publisher]</p></article></body>\n</html>";

/// Returns the canned response for a stage.
#[must_use]
pub fn stage_response(stage: StageName) -> &'static str {
    match stage {
        StageName::Research => RESEARCH_RESPONSE,
        StageName::Writer => WRITER_RESPONSE,
        StageName::Editor => EDITOR_RESPONSE,
        StageName::Seo => SEO_RESPONSE,
        StageName::Publisher => PUBLISHER_RESPONSE,
        StageName::HtmlPublisher => HTML_RESPONSE,
    }
}

/// Pipeline options for tests: default sampling, fixture author.
#[must_use]
pub fn test_options(generate_html: bool) -> PipelineOptions {
    PipelineOptions {
        generation: GenerationOptions {
            model: "test-model".to_string(),
            ..GenerationOptions::default()
        },
        generate_html,
        author: TEST_AUTHOR.to_string(),
    }
}

/// Builds a pipeline with the built-in stages over `provider`.
#[must_use]
pub fn test_pipeline(provider: Arc<dyn ChatProvider>, generate_html: bool) -> ContentPipeline {
    ContentPipeline::new(provider, test_options(generate_html))
}
