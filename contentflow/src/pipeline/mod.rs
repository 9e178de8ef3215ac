//! Pipeline building and execution.
//!
//! This module provides:
//! - The sequential [`ContentPipeline`] and its run options
//! - A validating [`PipelineBuilder`] for custom stage sets
//! - The run-level [`PipelineState`] machine
//! - Sequential batch runs

mod batch;
mod builder;
mod orchestrator;
mod state;

#[cfg(test)]
mod integration_tests;

pub use batch::{BatchFailure, BatchOutcome};
pub use builder::PipelineBuilder;
pub use orchestrator::{ContentPipeline, PipelineOptions};
pub use state::PipelineState;
