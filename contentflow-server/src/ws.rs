//! WebSocket progress streaming (live mode).
//!
//! Frames are JSON objects `{"event": <name>, "data": <payload>}`. A client
//! starts a run with `start-workflow`; the server answers with
//! `status-update`, one `agent-progress` per stage transition, and finally
//! `workflow-complete` or `error`.

use crate::state::SharedState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use contentflow::core::{ContentMetadata, ProgressEvent};
use contentflow::events::{LoggingSink, ProgressNotifier, ProgressSink};
use contentflow::pipeline::ContentPipeline;
use contentflow::utils::generate_uuid;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Messages sent to WebSocket clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Connection and run lifecycle notices.
    #[serde(rename_all = "camelCase")]
    StatusUpdate {
        /// Human-readable notice.
        message: String,
        /// Set on the greeting sent when a session connects.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
    },
    /// A stage transition.
    AgentProgress(ProgressEvent),
    /// The run finished.
    WorkflowComplete {
        /// Published markdown.
        markdown: String,
        /// Rendered HTML, when enabled.
        html: Option<String>,
        /// Final article metadata.
        metadata: ContentMetadata,
        /// Human-readable notice.
        message: String,
    },
    /// The run or the last client message failed.
    Error {
        /// What went wrong.
        message: String,
    },
}

/// Messages received from WebSocket clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Starts a run for a topic.
    StartWorkflow {
        /// The topic to write about.
        topic: String,
    },
}

/// Forwards progress events into a session's outbound channel.
#[derive(Debug, Clone)]
pub struct SessionSink {
    tx: mpsc::UnboundedSender<ServerMessage>,
}

impl SessionSink {
    /// Creates a sink writing to `tx`.
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for SessionSink {
    fn try_emit(&self, event: &ProgressEvent) {
        // A disconnected session just stops receiving.
        let _ = self.tx.send(ServerMessage::AgentProgress(event.clone()));
    }
}

/// Runs the pipeline for `topic`, streaming progress to `session` if given.
///
/// Without a session the run still happens; progress only reaches the log.
pub async fn run_workflow(
    pipeline: Arc<ContentPipeline>,
    topic: String,
    session: Option<mpsc::UnboundedSender<ServerMessage>>,
) {
    let notifier = ProgressNotifier::with_sink(Arc::new(LoggingSink::debug()));
    if let Some(tx) = &session {
        notifier.subscribe(Arc::new(SessionSink::new(tx.clone())));
    }

    let send = |message: ServerMessage| {
        if let Some(tx) = &session {
            let _ = tx.send(message);
        }
    };

    send(ServerMessage::StatusUpdate {
        message: format!("Starting content generation for \"{topic}\""),
        session_id: None,
    });

    match pipeline.run(&topic, &notifier).await {
        Ok(result) => {
            info!(topic = %topic, "Workflow complete");
            send(ServerMessage::WorkflowComplete {
                markdown: result.markdown.content.clone(),
                html: result.html_content().map(str::to_string),
                metadata: result.metadata().clone(),
                message: "Content generation complete".to_string(),
            });
        }
        Err(err) => {
            warn!(topic = %topic, error = %err, "Workflow failed");
            send(ServerMessage::Error {
                message: err.to_string(),
            });
        }
    }
}

/// `GET /ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    let session_id = generate_uuid().to_string();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.sessions.insert(session_id.clone(), tx.clone()).await;
    info!(session_id = %session_id, "WebSocket session connected");

    let _ = tx.send(ServerMessage::StatusUpdate {
        message: "Connected to content pipeline".to_string(),
        session_id: Some(session_id.clone()),
    });

    let (mut sender, mut receiver) = socket.split();

    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&message) else {
                continue;
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::StartWorkflow { topic }) => {
                    debug!(session_id = %session_id, topic = %topic, "start-workflow received");
                    tokio::spawn(run_workflow(Arc::clone(&state.pipeline), topic, Some(tx.clone())));
                }
                Err(err) => {
                    let _ = tx.send(ServerMessage::Error {
                        message: format!("Invalid message: {err}"),
                    });
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.sessions.remove(&session_id).await;
    send_task.abort();
    info!(session_id = %session_id, "WebSocket session closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentflow::core::{ProgressStatus, StageName};
    use contentflow::testing::{test_pipeline, ScriptedProvider};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_status_update_frame() {
        let frame = serde_json::to_value(ServerMessage::StatusUpdate {
            message: "Connected".into(),
            session_id: Some("s1".into()),
        })
        .unwrap();
        assert_eq!(
            frame,
            json!({"event": "status-update", "data": {"message": "Connected", "sessionId": "s1"}})
        );
    }

    #[test]
    fn test_agent_progress_frame() {
        let event = ProgressEvent::new(StageName::Seo, ProgressStatus::Active);
        let frame = serde_json::to_value(ServerMessage::AgentProgress(event)).unwrap();
        assert_eq!(frame["event"], "agent-progress");
        assert_eq!(frame["data"]["agent"], "seo");
        assert_eq!(frame["data"]["status"], "active");
    }

    #[test]
    fn test_parse_start_workflow() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"event":"start-workflow","data":{"topic":"Rust"}}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::StartWorkflow {
                topic: "Rust".into()
            }
        );
        assert!(serde_json::from_str::<ClientMessage>(r#"{"event":"stop"}"#).is_err());
    }

    #[tokio::test]
    async fn test_run_workflow_streams_to_session() {
        let pipeline = Arc::new(test_pipeline(Arc::new(ScriptedProvider::new()), false));
        let (tx, mut rx) = mpsc::unbounded_channel();

        run_workflow(pipeline, "Quantum Computing".into(), Some(tx)).await;

        let mut messages = Vec::new();
        while let Ok(message) = rx.try_recv() {
            messages.push(message);
        }

        assert!(matches!(messages.first(), Some(ServerMessage::StatusUpdate { .. })));
        let progress = messages
            .iter()
            .filter(|m| matches!(m, ServerMessage::AgentProgress(_)))
            .count();
        assert_eq!(progress, 10);
        match messages.last() {
            Some(ServerMessage::WorkflowComplete { metadata, html, .. }) => {
                assert_eq!(metadata.title, "Quantum Computing");
                assert!(html.is_none());
            }
            other => panic!("unexpected final message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_workflow_reports_failure() {
        let provider = ScriptedProvider::new().fail_on_stage(StageName::Editor);
        let pipeline = Arc::new(test_pipeline(Arc::new(provider), false));
        let (tx, mut rx) = mpsc::unbounded_channel();

        run_workflow(pipeline, "Rust".into(), Some(tx)).await;

        let mut last = None;
        while let Ok(message) = rx.try_recv() {
            last = Some(message);
        }
        match last {
            Some(ServerMessage::Error { message }) => assert!(message.contains("editor")),
            other => panic!("unexpected final message: {other:?}"),
        }
    }
}
