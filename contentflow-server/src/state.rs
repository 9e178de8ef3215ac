//! Shared server state.

use crate::ws::ServerMessage;
use clap::ValueEnum;
use contentflow::jobs::JobManager;
use contentflow::pipeline::ContentPipeline;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Which transport surface the router exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    /// HTTP plus WebSocket progress streaming.
    #[default]
    Live,
    /// `202 Accepted` plus status polling.
    Jobs,
}

impl fmt::Display for ServerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Jobs => write!(f, "jobs"),
        }
    }
}

/// Connected WebSocket sessions, keyed by session id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, mpsc::UnboundedSender<ServerMessage>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session's outbound channel.
    pub async fn insert(&self, id: impl Into<String>, tx: mpsc::UnboundedSender<ServerMessage>) {
        self.sessions.write().await.insert(id.into(), tx);
    }

    /// Removes a session. Returns false if it was not registered.
    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Returns the outbound channel of a connected session.
    pub async fn get(&self, id: &str) -> Option<mpsc::UnboundedSender<ServerMessage>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Returns the number of connected sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns true if no session is connected.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// State shared by every handler.
#[derive(Debug)]
pub struct AppState {
    /// The pipeline every run goes through.
    pub pipeline: Arc<ContentPipeline>,
    /// Background job lifecycle (jobs mode).
    pub jobs: Arc<JobManager>,
    /// Connected WebSocket sessions (live mode).
    pub sessions: SessionRegistry,
    /// Where `saveToFile` writes articles.
    pub output_dir: PathBuf,
}

impl AppState {
    /// Creates state writing saved content to `./output`.
    #[must_use]
    pub fn new(pipeline: Arc<ContentPipeline>, jobs: Arc<JobManager>) -> Self {
        Self {
            pipeline,
            jobs,
            sessions: SessionRegistry::new(),
            output_dir: PathBuf::from("./output"),
        }
    }

    /// Sets the directory used by `saveToFile`.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

/// Handle passed to axum handlers.
pub type SharedState = Arc<AppState>;
