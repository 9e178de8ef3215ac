//! Testing utilities for content pipelines.
//!
//! This module provides:
//! - Scripted chat providers with canned per-stage responses
//! - Assertions over stage order and progress streams
//! - Pipeline fixtures

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_html_document, assert_progress_sequence, assert_stage_order};
pub use fixtures::{
    stage_response, test_options, test_pipeline, EDITOR_RESPONSE, HTML_RESPONSE, PUBLISHER_RESPONSE,
    RESEARCH_RESPONSE, SEO_RESPONSE, TEST_AUTHOR, WRITER_RESPONSE,
};
pub use mocks::{FailingProvider, ScriptedProvider};
