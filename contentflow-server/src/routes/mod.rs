//! HTTP routes.

pub mod generate;
pub mod health;
pub mod jobs;
pub mod workflow;

use crate::error::ApiError;
use crate::state::{ServerMode, SharedState};
use crate::ws;
use axum::routing::{get, post};
use axum::Router;
use contentflow::errors::ContentflowError;
use contentflow::utils::text::is_blank;
use tower_http::cors::CorsLayer;

/// Builds the router for a mode.
///
/// `/health` and `/api/generate` are mounted in both modes; `/api/workflow`
/// starts a streamed run in live mode and a polled job in jobs mode.
pub fn build_router(state: SharedState, mode: ServerMode) -> Router {
    let router = Router::new()
        .route("/health", get(health::health))
        .route("/api/generate", post(generate::generate));

    let router = match mode {
        ServerMode::Live => router
            .route("/api/workflow", post(workflow::start_workflow))
            .route("/ws", get(ws::ws_handler)),
        ServerMode::Jobs => router
            .route("/api/workflow", post(jobs::submit_job))
            .route("/api/status/:job_id", get(jobs::job_status)),
    };

    router.layer(CorsLayer::permissive()).with_state(state)
}

/// Returns the trimmed topic, or the "Topic is required" error.
pub(crate) fn require_topic(topic: Option<String>) -> Result<String, ApiError> {
    match topic {
        Some(topic) if !is_blank(&topic) => Ok(topic.trim().to_string()),
        _ => Err(ContentflowError::topic_required().into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_topic() {
        assert_eq!(require_topic(Some("  Rust ".into())).unwrap(), "Rust");
        assert!(require_topic(Some("   ".into())).is_err());
        assert!(require_topic(None).is_err());
    }
}
