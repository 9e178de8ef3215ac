//! # Contentflow server
//!
//! HTTP and WebSocket transports for the [`contentflow`] pipeline.
//!
//! Two modes share one router builder:
//!
//! - [`ServerMode::Live`]: runs are started over HTTP or WebSocket and their
//!   progress is streamed to the connected WebSocket session.
//! - [`ServerMode::Jobs`]: `POST /api/workflow` answers `202` with a job id
//!   and the result is fetched by polling `GET /api/status/:job_id`.
//!
//! `POST /api/generate` (synchronous, returns the article and its progress
//! log) and `GET /health` are served in both modes.

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

pub mod error;
pub mod routes;
pub mod state;
pub mod ws;

pub use error::ApiError;
pub use routes::build_router;
pub use state::{AppState, ServerMode, SessionRegistry};
