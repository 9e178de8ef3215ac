//! Sequential batch runs.

use super::ContentPipeline;
use crate::core::ContentResult;
use crate::events::ProgressNotifier;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// A topic that failed during a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    /// Zero-based index of the topic in the input.
    pub index: usize,
    /// The topic as given.
    pub topic: String,
    /// Error message.
    pub error: String,
}

/// Outcome of a batch: one slot per input topic.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    /// Results aligned with the input; `None` where the run failed.
    pub results: Vec<Option<ContentResult>>,
    /// Failures, in input order.
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    /// Returns the number of successful runs.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_some()).count()
    }

    /// Returns true if every topic succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

impl ContentPipeline {
    /// Runs the pipeline for each topic in order, waiting `delay` between runs.
    ///
    /// A failing topic is recorded and the batch continues with the next one.
    #[instrument(name = "pipeline.batch", skip(self, topics, notifier), fields(topics = topics.len()))]
    pub async fn run_batch<S>(&self, topics: &[S], delay: Duration, notifier: &ProgressNotifier) -> BatchOutcome
    where
        S: AsRef<str> + Sync,
    {
        let mut outcome = BatchOutcome {
            results: Vec::with_capacity(topics.len()),
            failures: Vec::new(),
        };

        for (index, topic) in topics.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let topic = topic.as_ref();
            info!(index, total = topics.len(), topic, "Batch item started");
            match self.run(topic, notifier).await {
                Ok(result) => outcome.results.push(Some(result)),
                Err(err) => {
                    warn!(index, topic, error = %err, "Batch item failed");
                    outcome.results.push(None);
                    outcome.failures.push(BatchFailure {
                        index,
                        topic: topic.to_string(),
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            succeeded = outcome.succeeded(),
            failed = outcome.failures.len(),
            "Batch finished"
        );
        outcome
    }
}
