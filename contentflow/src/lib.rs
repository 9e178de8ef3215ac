//! # Contentflow
//!
//! A sequential content-generation pipeline driven by a chat-completion API.
//!
//! A topic flows through six stages, each one prompt and one model call:
//!
//! - **Research**: facts, angles and target keywords
//! - **Writer / Editor**: a markdown draft, then an edited version
//! - **SEO**: keyword optimization plus title, description and slug
//! - **Publisher**: the final markdown, stamped with reading statistics
//! - **HTML publisher** (optional): a standalone HTML document
//!
//! Progress is published per run through a [`ProgressNotifier`](events::ProgressNotifier);
//! asynchronous runs are tracked by a [`JobManager`](jobs::JobManager) over a
//! pluggable [`JobStore`](jobs::JobStore).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use contentflow::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::from_env()?;
//! let provider = Arc::new(OpenAiProvider::new(&settings.provider)?);
//! let pipeline = ContentPipeline::from_settings(provider, &settings);
//!
//! let notifier = ProgressNotifier::with_sink(Arc::new(LoggingSink::default()));
//! let result = pipeline.run("Quantum Computing", &notifier).await?;
//! println!("{}", result.markdown.content);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod jobs;
pub mod llm;
pub mod observability;
pub mod output;
pub mod pipeline;
pub mod stages;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{LogFormat, ProviderSettings, Settings};
    pub use crate::core::{
        ContentMetadata, ContentResult, ProgressEvent, ProgressStatus, StageName, StageResult,
    };
    pub use crate::errors::{ContentflowError, Result};
    pub use crate::events::{
        ChannelSink, CollectingSink, LoggingSink, NoOpSink, ProgressNotifier, ProgressSink,
    };
    pub use crate::jobs::{InMemoryJobStore, Job, JobId, JobManager, JobStatus, JobStore};
    #[cfg(feature = "openai")]
    pub use crate::llm::OpenAiProvider;
    pub use crate::llm::{ChatProvider, ChatRequest, LlmResponse};
    pub use crate::pipeline::{BatchOutcome, ContentPipeline, PipelineBuilder, PipelineOptions};
    pub use crate::stages::{PromptStage, Stage, StageConfig};
    pub use crate::utils::{generate_uuid, iso_timestamp, Timestamp};
}
