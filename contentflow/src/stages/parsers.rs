//! Output parsers turning raw model text into stage results.

use crate::core::{ContentMetadata, StageFields};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Maximum number of keywords kept from a response.
pub const MAX_KEYWORDS: usize = 15;

const DOCTYPE: &str = "<!DOCTYPE html>";

/// How a stage's raw response is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputParser {
    /// Keep the full text; extract a trailing `KEYWORDS:` line.
    Research,
    /// Markdown article; strip a wrapping code fence.
    Markdown,
    /// Article followed by a `---SEO---` block of `KEY: value` lines.
    Seo,
    /// Standalone HTML document; guarantee a `<!DOCTYPE html>` prefix.
    Html,
}

/// Text and fields extracted from one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOutput {
    /// Text handed to the next stage.
    pub text: String,
    /// Extracted structured fields.
    pub fields: StageFields,
}

impl OutputParser {
    /// Parses a raw response.
    ///
    /// `metadata` is the run's metadata so far (used to title wrapped HTML).
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when the parsed text is empty.
    pub fn parse(self, raw: &str, metadata: &ContentMetadata) -> Result<ParsedOutput, String> {
        let parsed = match self {
            Self::Research => ParsedOutput {
                text: raw.trim().to_string(),
                fields: StageFields {
                    keywords: extract_keywords(raw),
                    ..StageFields::default()
                },
            },
            Self::Markdown => ParsedOutput {
                text: strip_code_fence(raw),
                fields: StageFields::default(),
            },
            Self::Seo => parse_seo(raw),
            Self::Html => ParsedOutput {
                text: ensure_html_document(raw, metadata),
                fields: StageFields::default(),
            },
        };

        if parsed.text.trim().is_empty() {
            return Err(format!("{self:?} parser produced empty output"));
        }
        Ok(parsed)
    }
}

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?```\s*$").expect("valid regex"));

static KEYWORDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*[*_]*keywords?[*_]*[ \t]*:[*_]*[ \t]*(.+?)[ \t]*$").expect("valid regex")
});

static SEO_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*-{3,}[ \t]*SEO[ \t]*-{3,}[ \t]*$").expect("valid regex"));

static SEO_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[ \t]*[*_]*(title|meta_description|meta description|description|slug|keywords)[*_]*[ \t]*:[*_]*[ \t]*(.+?)[ \t]*$",
    )
    .expect("valid regex")
});

static HTML_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```html[ \t]*\r?\n(.*?)```").expect("valid regex"));

/// Removes a code fence wrapping the whole text, if present.
#[must_use]
pub fn strip_code_fence(raw: &str) -> String {
    let trimmed = raw.trim();
    FENCE_RE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map_or(trimmed, |m| m.as_str())
        .trim()
        .to_string()
}

/// Splits a comma-separated keyword list, dropping duplicates and decoration.
#[must_use]
pub fn split_keywords(list: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for raw in list.split([',', ';']) {
        let keyword = raw
            .trim()
            .trim_matches(|c: char| matches!(c, '"' | '\'' | '*' | '`' | '.' | '[' | ']'))
            .trim()
            .to_string();
        if keyword.is_empty() || keywords.iter().any(|k| k.eq_ignore_ascii_case(&keyword)) {
            continue;
        }
        keywords.push(keyword);
        if keywords.len() == MAX_KEYWORDS {
            break;
        }
    }
    keywords
}

/// Extracts the keywords from the last `KEYWORDS:` line in the text.
#[must_use]
pub fn extract_keywords(text: &str) -> Vec<String> {
    KEYWORDS_RE
        .captures_iter(text)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| split_keywords(m.as_str()))
        .unwrap_or_default()
}

fn parse_seo(raw: &str) -> ParsedOutput {
    let (body, block) = match SEO_MARKER_RE.find(raw) {
        Some(marker) => (raw[..marker.start()].to_string(), &raw[marker.end()..]),
        None => {
            let (body, fields) = split_trailing_fields(raw);
            (body.to_string(), fields)
        }
    };

    let mut fields = StageFields::default();
    for caps in SEO_FIELD_RE.captures_iter(block) {
        let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let value = value.as_str().trim().to_string();
        match key.as_str().to_ascii_lowercase().as_str() {
            "title" => fields.seo_title = Some(value),
            "slug" => fields.slug = Some(value),
            "keywords" => fields.keywords = split_keywords(&value),
            _ => fields.description = Some(value),
        }
    }

    ParsedOutput {
        text: strip_code_fence(&body),
        fields,
    }
}

/// Splits `raw` before the run of `KEY: value` field lines that ends it.
///
/// Field-like lines followed by anything else are article text and stay in
/// the body.
fn split_trailing_fields(raw: &str) -> (&str, &str) {
    let trimmed = raw.trim_end();
    let mut cut = trimmed.len();
    let mut line_end = trimmed.len();
    loop {
        let line_start = trimmed[..line_end].rfind('\n').map_or(0, |i| i + 1);
        if !SEO_FIELD_RE.is_match(&trimmed[line_start..line_end]) {
            break;
        }
        cut = line_start;
        if line_start == 0 {
            break;
        }
        line_end = line_start - 1;
    }
    (&trimmed[..cut], &trimmed[cut..])
}

/// Escapes text for inclusion in HTML.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Returns a complete HTML document starting with `<!DOCTYPE html>`.
///
/// A fenced html block is unwrapped first; a full `<html>` document missing
/// its doctype gets one prepended; anything else is treated as a body
/// fragment and wrapped in a minimal document.
#[must_use]
pub fn ensure_html_document(raw: &str, metadata: &ContentMetadata) -> String {
    let html = HTML_FENCE_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| strip_code_fence(raw), |m| m.as_str().trim().to_string());

    if html.is_empty() {
        return html;
    }

    let lower = html.to_ascii_lowercase();
    if lower.starts_with("<!doctype html") {
        let rest = html.find('>').map_or("", |end| &html[end + 1..]);
        return format!("{DOCTYPE}{rest}");
    }
    if lower.contains("<html") {
        return format!("{DOCTYPE}\n{html}");
    }

    format!(
        "{DOCTYPE}\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<meta name=\"description\" content=\"{description}\">\n\
         </head>\n<body>\n<article>\n{html}\n</article>\n</body>\n</html>",
        title = escape_html(&metadata.title),
        description = escape_html(&metadata.description),
    )
}
