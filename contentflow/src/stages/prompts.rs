//! Prompt templates for the built-in stages.
//!
//! Placeholders: `{topic}`, `{previous}`, `{keywords}`, `{title}`, `{description}`.

pub(crate) const RESEARCH_SYSTEM: &str = "You are a meticulous research assistant. You gather accurate, \
current and well-organized information that a professional writer can turn into an article.";

pub(crate) const RESEARCH_USER: &str = "Research the topic: \"{topic}\".

Provide:
1. A short overview of the topic
2. Key facts and statistics
3. Important subtopics and angles worth covering
4. Common questions readers ask
5. Notable examples or case studies

Finish with a single line in the form:
KEYWORDS: keyword one, keyword two, keyword three
listing 5 to 10 search keywords for the topic.";

pub(crate) const WRITER_SYSTEM: &str = "You are an experienced content writer who produces engaging, \
well-structured blog posts in Markdown.";

pub(crate) const WRITER_USER: &str = "Write a comprehensive blog post about \"{topic}\" using the research below.

Requirements:
- Start with a level-one heading
- Use level-two and level-three headings for sections
- Include an introduction and a conclusion
- Aim for 1200 to 1800 words
- Work in these keywords naturally: {keywords}

Research:
{previous}";

pub(crate) const EDITOR_SYSTEM: &str = "You are a senior editor. You improve clarity, flow, grammar and \
factual consistency without changing the author's voice.";

pub(crate) const EDITOR_USER: &str = "Edit the following blog post about \"{topic}\".

Fix grammar and spelling, tighten wordy passages, improve transitions and make sure headings are \
consistent. Return only the edited article in Markdown.

Article:
{previous}";

pub(crate) const SEO_SYSTEM: &str = "You are an SEO specialist who optimizes articles for search engines \
while keeping them pleasant to read.";

pub(crate) const SEO_USER: &str = "Optimize the following article about \"{topic}\" for search.

Target keywords: {keywords}

Improve headings, keyword placement and internal structure. Return the optimized article in \
Markdown, then append this block exactly:

---SEO---
TITLE: <search title under 60 characters>
META_DESCRIPTION: <description under 160 characters>
SLUG: <url-slug>
KEYWORDS: <comma separated keywords>

Article:
{previous}";

pub(crate) const PUBLISHER_SYSTEM: &str = "You are a publishing editor who prepares articles for release.";

pub(crate) const PUBLISHER_USER: &str = "Prepare this article titled \"{title}\" for publication.

Make sure it has a compelling introduction, clear section headings, a conclusion with a call to \
action and consistent Markdown formatting. Do not add front matter. Return only the final \
Markdown.

Meta description: {description}
Keywords: {keywords}

Article:
{previous}";

pub(crate) const HTML_SYSTEM: &str = "You are a front-end developer who converts Markdown articles into \
clean, semantic, responsive HTML5 documents.";

pub(crate) const HTML_USER: &str = "Convert the following Markdown article into a complete HTML5 document.

Requirements:
- Begin with <!DOCTYPE html>
- Use <title>{title}</title> and a meta description of \"{description}\"
- Include meta keywords: {keywords}
- Use semantic elements (header, main, article, footer)
- Inline a small, readable stylesheet
- Return only the HTML document

Markdown:
{previous}";
