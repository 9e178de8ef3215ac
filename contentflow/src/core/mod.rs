//! Core domain model types for contentflow.
//!
//! This module contains the fundamental types used throughout the crate:
//! - Stage names and progress statuses
//! - Progress events relayed to clients
//! - Content metadata and stage/run results

mod event;
mod metadata;
mod result;
mod stage;

pub use event::{ProgressEvent, OUTPUT_EXCERPT_CHARS};
pub use metadata::ContentMetadata;
pub use result::{ContentResult, HtmlDocument, MarkdownDocument, StageFields, StageResult};
pub use stage::{ProgressStatus, StageName};
