//! End-to-end tests for pipeline runs against scripted providers.

use super::*;
use crate::core::{ProgressStatus, StageName};
use crate::errors::ContentflowError;
use crate::events::{CollectingSink, ProgressNotifier};
use crate::llm::MockChatProvider;
use crate::testing::{
    assert_html_document, assert_progress_sequence, assert_stage_order, test_options, test_pipeline,
    FailingProvider, ScriptedProvider, PUBLISHER_RESPONSE, TEST_AUTHOR,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::{Duration, Instant};

const FIVE: [StageName; 5] = [
    StageName::Research,
    StageName::Writer,
    StageName::Editor,
    StageName::Seo,
    StageName::Publisher,
];

fn collecting_notifier() -> (ProgressNotifier, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::new());
    (ProgressNotifier::with_sink(sink.clone()), sink)
}

#[tokio::test]
async fn test_full_run_produces_markdown_html_and_metadata() {
    let provider = Arc::new(ScriptedProvider::new());
    let pipeline = test_pipeline(provider.clone(), true);
    let (notifier, sink) = collecting_notifier();

    let result = pipeline.run("Quantum Computing", &notifier).await.unwrap();

    assert_stage_order(&result, &StageName::ALL);
    assert_eq!(provider.called_stages(), StageName::ALL.to_vec());
    assert_progress_sequence(&sink.events(), &StageName::ALL);
    assert_html_document(&result);

    let metadata = result.metadata();
    assert_eq!(metadata.title, "Quantum Computing");
    assert_eq!(metadata.slug, "quantum-computing");
    assert_eq!(metadata.author, TEST_AUTHOR);
    assert_eq!(metadata.description, "A concise summary for search results.");
    assert_eq!(metadata.seo_title.as_deref(), Some("Optimized Title"));
    assert_eq!(metadata.keywords, vec!["primary keyword", "secondary keyword"]);
    assert!(metadata.is_final());
    assert!(metadata.word_count > 0);
    assert!(metadata.reading_time >= 1);
    assert_eq!(result.markdown.content, PUBLISHER_RESPONSE);
}

#[tokio::test]
async fn test_each_stage_consumes_previous_output() {
    let provider = Arc::new(ScriptedProvider::new());
    let pipeline = test_pipeline(provider.clone(), true);

    let result = pipeline.run("Rust", &ProgressNotifier::new()).await.unwrap();

    for pair in StageName::ALL.windows(2) {
        let upstream = result.stage(pair[0]).unwrap();
        let request = provider.request_for(pair[1]).unwrap();
        assert!(
            request.user_prompt().contains(&upstream.output),
            "{} prompt should embed {} output",
            pair[1],
            pair[0]
        );
    }
    assert!(!provider.request_for(StageName::Research).unwrap().user_prompt().contains("[research]"));
}

#[tokio::test]
async fn test_html_disabled_skips_html_stage() {
    let provider = Arc::new(ScriptedProvider::new());
    let pipeline = test_pipeline(provider.clone(), false);
    let (notifier, sink) = collecting_notifier();

    let result = pipeline.run("Rust", &notifier).await.unwrap();

    assert!(result.html.is_none());
    assert_stage_order(&result, &FIVE);
    assert_eq!(provider.call_count(), 5);
    assert_progress_sequence(&sink.events(), &FIVE);
}

#[tokio::test]
async fn test_blank_topic_never_calls_provider() {
    let mut provider = MockChatProvider::new();
    provider.expect_complete().never();
    provider.expect_name().return_const("mock".to_string());
    let pipeline = ContentPipeline::new(Arc::new(provider), test_options(true));
    let (notifier, sink) = collecting_notifier();

    for topic in ["", "   ", "\n\t"] {
        let err = pipeline.run(topic, &notifier).await.unwrap_err();
        assert!(matches!(err, ContentflowError::InvalidInput(_)));
        assert_eq!(err.to_string(), "Topic is required");
    }
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_failure_stops_at_failing_stage() {
    let provider = Arc::new(ScriptedProvider::new().fail_on_stage(StageName::Editor));
    let pipeline = test_pipeline(provider.clone(), true);
    let (notifier, sink) = collecting_notifier();

    let err = pipeline.run("Rust", &notifier).await.unwrap_err();

    assert_eq!(err.failed_stage(), Some(StageName::Editor));
    assert_eq!(
        provider.called_stages(),
        vec![StageName::Research, StageName::Writer, StageName::Editor]
    );

    let events: Vec<_> = sink.events().iter().map(|e| (e.agent, e.status)).collect();
    assert_eq!(
        events,
        vec![
            (StageName::Research, ProgressStatus::Active),
            (StageName::Research, ProgressStatus::Completed),
            (StageName::Writer, ProgressStatus::Active),
            (StageName::Writer, ProgressStatus::Completed),
            (StageName::Editor, ProgressStatus::Active),
        ]
    );
}

#[tokio::test]
async fn test_unreachable_provider_fails_at_research() {
    let pipeline = test_pipeline(Arc::new(FailingProvider::new("connection refused")), true);
    let err = pipeline.run("Rust", &ProgressNotifier::new()).await.unwrap_err();

    assert_eq!(err.failed_stage(), Some(StageName::Research));
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn test_seo_slug_overrides_topic_slug() {
    let provider = Arc::new(ScriptedProvider::new().with_response(
        StageName::Seo,
        "# Body\n\n---SEO---\nTITLE: T\nMETA_DESCRIPTION: D\nSLUG: Custom Slug!\nKEYWORDS: k1",
    ));
    let pipeline = test_pipeline(provider, false);

    let result = pipeline.run("Rust", &ProgressNotifier::new()).await.unwrap();

    assert_eq!(result.metadata().slug, "custom-slug");
    assert_eq!(result.metadata().title, "Rust");
    assert_eq!(result.metadata().keywords, vec!["k1"]);
}

#[tokio::test]
async fn test_concurrent_runs_have_isolated_events() {
    let provider = Arc::new(ScriptedProvider::new().with_delay(Duration::from_millis(5)));
    let pipeline = Arc::new(test_pipeline(provider, false));
    let (first_notifier, first_sink) = collecting_notifier();
    let (second_notifier, second_sink) = collecting_notifier();

    let (a, b) = tokio::join!(
        pipeline.run("First", &first_notifier),
        pipeline.run("Second", &second_notifier)
    );

    assert_eq!(a.unwrap().metadata().title, "First");
    assert_eq!(b.unwrap().metadata().title, "Second");
    assert_progress_sequence(&first_sink.events(), &FIVE);
    assert_progress_sequence(&second_sink.events(), &FIVE);
}

#[tokio::test]
async fn test_batch_records_failure_and_continues() {
    let provider = Arc::new(ScriptedProvider::new().fail_when_prompt_contains("Broken"));
    let pipeline = test_pipeline(provider, false);
    let topics = ["Alpha", "Broken Topic", "Gamma"];

    let outcome = pipeline
        .run_batch(&topics, Duration::ZERO, &ProgressNotifier::new())
        .await;

    assert_eq!(outcome.results.len(), 3);
    assert!(outcome.results[0].is_some());
    assert!(outcome.results[1].is_none());
    assert!(outcome.results[2].is_some());
    assert_eq!(outcome.succeeded(), 2);
    assert!(!outcome.all_succeeded());
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].index, 1);
    assert_eq!(outcome.failures[0].topic, "Broken Topic");
    assert!(outcome.failures[0].error.contains("research"));
}

#[tokio::test]
async fn test_batch_waits_between_runs() {
    let pipeline = test_pipeline(Arc::new(ScriptedProvider::new()), false);
    let topics = vec!["One".to_string(), "Two".to_string(), "Three".to_string()];

    let started = Instant::now();
    let outcome = pipeline
        .run_batch(&topics, Duration::from_millis(20), &ProgressNotifier::new())
        .await;

    assert!(outcome.all_succeeded());
    assert!(started.elapsed() >= Duration::from_millis(40));
}

#[tokio::test]
async fn test_empty_batch() {
    let pipeline = test_pipeline(Arc::new(ScriptedProvider::new()), false);
    let outcome = pipeline
        .run_batch::<&str>(&[], Duration::from_secs(60), &ProgressNotifier::new())
        .await;
    assert!(outcome.results.is_empty());
    assert!(outcome.all_succeeded());
}
