//! Route tests driving the router in-process.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use contentflow::core::StageName;
use contentflow::jobs::{InMemoryJobStore, JobId, JobManager};
use contentflow::testing::{test_pipeline, ScriptedProvider};
use contentflow_server::ws::ServerMessage;
use contentflow_server::{build_router, AppState, ServerMode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower::ServiceExt;

struct Harness {
    router: Router,
    state: Arc<AppState>,
    jobs: Arc<JobManager>,
    provider: Arc<ScriptedProvider>,
}

fn harness_with(provider: ScriptedProvider, mode: ServerMode, output_dir: &Path) -> Harness {
    let provider = Arc::new(provider);
    let pipeline = Arc::new(test_pipeline(provider.clone(), true));
    let jobs = Arc::new(JobManager::new(Arc::new(InMemoryJobStore::new())));
    let state = Arc::new(AppState::new(pipeline, Arc::clone(&jobs)).with_output_dir(output_dir));
    Harness {
        router: build_router(Arc::clone(&state), mode),
        state,
        jobs,
        provider,
    }
}

fn harness(mode: ServerMode) -> Harness {
    harness_with(ScriptedProvider::new(), mode, Path::new("./output"))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    for mode in [ServerMode::Live, ServerMode::Jobs] {
        let (status, body) = send(&harness(mode).router, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}

#[tokio::test]
async fn test_generate_rejects_blank_topic() {
    let h = harness(ServerMode::Live);

    for payload in [r#"{"topic":"   "}"#, r#"{}"#] {
        let (status, body) = send(&h.router, post_json("/api/generate", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"success": false, "error": "Topic is required"}));
    }
    assert_eq!(h.provider.call_count(), 0);
}

#[tokio::test]
async fn test_generate_rejects_malformed_json() {
    let h = harness(ServerMode::Live);
    let (status, body) = send(&h.router, post_json("/api/generate", "{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid JSON body");
    assert_eq!(h.provider.call_count(), 0);
}

#[tokio::test]
async fn test_generate_returns_article_and_progress() {
    let h = harness(ServerMode::Live);
    let (status, body) =
        send(&h.router, post_json("/api/generate", r#"{"topic":"Quantum Computing"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["metadata"]["title"], "Quantum Computing");
    assert_eq!(body["metadata"]["slug"], "quantum-computing");
    assert!(body["html"].as_str().unwrap().starts_with("<!DOCTYPE html>"));
    assert!(body["generatedAt"].is_string());
    assert!(body.get("savedFiles").is_none());

    let progress = body["progress"].as_array().unwrap();
    assert_eq!(progress.len(), 12);
    assert_eq!(progress[0]["agent"], "research");
    assert_eq!(progress[0]["status"], "active");
    assert_eq!(progress[11]["agent"], "html-publisher");
    assert_eq!(progress[11]["status"], "completed");
}

#[tokio::test]
async fn test_generate_saves_files() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness_with(ScriptedProvider::new(), ServerMode::Jobs, dir.path());

    let (status, body) = send(
        &h.router,
        post_json("/api/generate", r#"{"topic":"Rust","saveToFile":true}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let markdown = body["savedFiles"]["markdown"].as_str().unwrap();
    assert!(Path::new(markdown).exists());
    assert!(body["savedFiles"]["html"].is_string());
}

#[tokio::test]
async fn test_generate_stage_failure() {
    let h = harness_with(
        ScriptedProvider::new().fail_on_stage(StageName::Seo),
        ServerMode::Live,
        Path::new("./output"),
    );
    let (status, body) = send(&h.router, post_json("/api/generate", r#"{"topic":"Rust"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Content generation failed");
    assert!(body["details"].as_str().unwrap().contains("seo"));
}

#[tokio::test]
async fn test_job_lifecycle() {
    let h = harness(ServerMode::Jobs);

    let (status, body) =
        send(&h.router, post_json("/api/workflow", r#"{"topic":"Quantum Computing"}"#)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "processing");
    assert_eq!(body["estimatedTime"], "2-3 minutes");

    let id: JobId = body["jobId"].as_str().unwrap().parse().unwrap();
    h.jobs.wait(&id).await.unwrap();

    let uri = format!("/api/status/{id}");
    let (status, first) = send(&h.router, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["status"], "completed");
    assert_eq!(first["topic"], "Quantum Computing");
    assert_eq!(first["result"]["markdown"]["metadata"]["title"], "Quantum Computing");
    assert!(first["completedAt"].is_string());

    let (_, second) = send(&h.router, get(&uri)).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_job_failure_is_recorded() {
    let h = harness_with(
        ScriptedProvider::new().fail_on_stage(StageName::Writer),
        ServerMode::Jobs,
        Path::new("./output"),
    );

    let (_, body) = send(&h.router, post_json("/api/workflow", r#"{"topic":"Rust"}"#)).await;
    let id: JobId = body["jobId"].as_str().unwrap().parse().unwrap();
    h.jobs.wait(&id).await.unwrap();

    let (status, job) = send(&h.router, get(&format!("/api/status/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["status"], "failed");
    assert!(job["error"].as_str().unwrap().contains("writer"));
    assert!(job.get("result").is_none());
}

#[tokio::test]
async fn test_workflow_rejects_blank_topic() {
    for mode in [ServerMode::Live, ServerMode::Jobs] {
        let h = harness(mode);
        let (status, body) = send(&h.router, post_json("/api/workflow", r#"{"topic":""}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"success": false, "error": "Topic is required"}));
        assert_eq!(h.jobs.in_flight_count(), 0);
        assert_eq!(h.provider.call_count(), 0);
    }
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let h = harness(ServerMode::Jobs);

    for id in [JobId::new().to_string(), "not-a-uuid".to_string()] {
        let (status, body) = send(&h.router, get(&format!("/api/status/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"success": false, "error": "Job not found"}));
    }
}

#[tokio::test]
async fn test_live_workflow_acknowledges() {
    let h = harness(ServerMode::Live);
    let (status, body) = send(
        &h.router,
        post_json("/api/workflow", r#"{"topic":"Rust","sessionId":"missing"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["sessionId"], "missing");
}

#[tokio::test]
async fn test_mode_specific_routes() {
    let live = harness(ServerMode::Live);
    let response = live.router.clone().oneshot(get("/api/status/x")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let jobs = harness(ServerMode::Jobs);
    let response = jobs.router.clone().oneshot(get("/ws")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_live_workflow_streams_to_connected_session() {
    let h = harness(ServerMode::Live);
    let (tx, mut rx) = mpsc::unbounded_channel();
    h.state.sessions.insert("session-1", tx).await;

    let (status, body) = send(
        &h.router,
        post_json("/api/workflow", r#"{"topic":"Quantum Computing","sessionId":"session-1"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], "session-1");

    let mut messages = Vec::new();
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let done = matches!(
            message,
            ServerMessage::WorkflowComplete { .. } | ServerMessage::Error { .. }
        );
        messages.push(message);
        if done {
            break;
        }
    }

    assert!(matches!(&messages[0], ServerMessage::StatusUpdate { message, .. } if message.contains("Quantum Computing")));
    let progress: Vec<(String, String)> = messages
        .iter()
        .filter_map(|m| match m {
            ServerMessage::AgentProgress(event) => Some((event.agent.to_string(), event.status.to_string())),
            _ => None,
        })
        .collect();
    assert_eq!(progress.len(), 12);
    assert_eq!(progress[0], ("research".to_string(), "active".to_string()));
    assert_eq!(progress[1], ("research".to_string(), "completed".to_string()));
    assert_eq!(progress[11], ("html-publisher".to_string(), "completed".to_string()));

    match messages.last() {
        Some(ServerMessage::WorkflowComplete { metadata, html, .. }) => {
            assert_eq!(metadata.title, "Quantum Computing");
            assert!(html.as_deref().unwrap().starts_with("<!DOCTYPE html>"));
        }
        other => panic!("unexpected final message: {other:?}"),
    }
}

