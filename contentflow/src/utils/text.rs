//! Text helpers for slugs, excerpts and reading statistics.

/// Words read per minute when estimating reading time.
pub const WORDS_PER_MINUTE: usize = 200;

/// Converts text into a lowercase, hyphen-separated URL slug.
///
/// Non-alphanumeric runs collapse into a single hyphen; leading and trailing
/// hyphens are removed.
///
/// ```
/// use contentflow::utils::text::slugify;
///
/// assert_eq!(slugify("Quantum Computing: 2024 Edition!"), "quantum-computing-2024-edition");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Counts whitespace-separated words.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Estimates reading time in whole minutes (at least one for non-empty text).
#[must_use]
pub fn reading_time_minutes(words: usize) -> usize {
    if words == 0 {
        0
    } else {
        words.div_ceil(WORDS_PER_MINUTE)
    }
}

/// Truncates text to at most `max_chars` characters, appending `...` when cut.
#[must_use]
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", trimmed[..idx].trim_end()),
        None => trimmed.to_string(),
    }
}

/// Returns true if the text is empty or whitespace only.
#[must_use]
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
