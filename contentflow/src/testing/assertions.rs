//! Assertions over pipeline results and progress streams.

use crate::core::{ContentResult, ProgressEvent, ProgressStatus, StageName};

/// Asserts that the result's stages ran in exactly the given order.
///
/// # Panics
///
/// Panics if the order differs.
pub fn assert_stage_order(result: &ContentResult, expected: &[StageName]) {
    let actual: Vec<StageName> = result.stages.iter().map(|r| r.stage).collect();
    assert_eq!(actual, expected, "unexpected stage order");
}

/// Asserts that `events` is exactly one `active` then one `completed` event
/// per stage, in the given stage order.
///
/// # Panics
///
/// Panics if the sequence differs.
pub fn assert_progress_sequence(events: &[ProgressEvent], stages: &[StageName]) {
    let actual: Vec<(StageName, ProgressStatus)> = events.iter().map(|e| (e.agent, e.status)).collect();
    let expected: Vec<(StageName, ProgressStatus)> = stages
        .iter()
        .flat_map(|s| [(*s, ProgressStatus::Active), (*s, ProgressStatus::Completed)])
        .collect();
    assert_eq!(actual, expected, "unexpected progress sequence");
}

/// Asserts that a run produced a complete HTML document.
///
/// # Panics
///
/// Panics if HTML is missing or lacks the doctype.
pub fn assert_html_document(result: &ContentResult) {
    let html = result.html_content().unwrap_or_else(|| panic!("expected HTML output"));
    assert!(
        html.starts_with("<!DOCTYPE html>"),
        "HTML should start with a doctype, got: {}",
        html.chars().take(40).collect::<String>()
    );
}
