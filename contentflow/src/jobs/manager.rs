//! Job lifecycle management over a [`JobStore`].

use super::{Job, JobId, JobStore};
use crate::core::ContentResult;
use crate::errors::{ContentflowError, Result};
use crate::events::{LoggingSink, ProgressNotifier};
use crate::pipeline::ContentPipeline;
use crate::utils::text::is_blank;
use dashmap::DashMap;
use futures::future::join_all;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, warn, Instrument};

/// Attempts per terminal write made by a background job.
const TERMINAL_WRITE_ATTEMPTS: u32 = 3;

/// Base delay between terminal write attempts; grows linearly.
const TERMINAL_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Creates jobs, runs them in the background and records exactly one
/// terminal state per job.
///
/// Jobs awaiting their terminal write live in an in-flight table; removing a
/// job from it is what grants the right to write the terminal record, so two
/// racing `complete`/`fail` calls can never both succeed. A terminal write the
/// store rejects puts the job back, so it can be retried.
pub struct JobManager {
    store: Arc<dyn JobStore>,
    in_flight: DashMap<JobId, Job>,
    tasks: DashMap<JobId, JoinHandle<()>>,
}

impl fmt::Debug for JobManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobManager")
            .field("store", &self.store.name())
            .field("in_flight", &self.in_flight.len())
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

impl JobManager {
    /// Creates a manager over a store.
    #[must_use]
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            in_flight: DashMap::new(),
            tasks: DashMap::new(),
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Returns the number of jobs still awaiting a terminal write.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns the number of background tasks that have not finished.
    #[must_use]
    pub fn running_count(&self) -> usize {
        self.tasks.len()
    }

    /// Creates a job in the `processing` state.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a blank topic, or a storage error.
    pub async fn create(&self, topic: &str) -> Result<JobId> {
        if is_blank(topic) {
            return Err(ContentflowError::topic_required());
        }
        let topic = topic.trim();

        let job = Job::processing(JobId::new(), topic);
        self.store.put(&job).await?;
        info!(job_id = %job.job_id, topic, store = self.store.name(), "Job created");

        let id = job.job_id;
        self.in_flight.insert(id, job);
        Ok(id)
    }

    /// Creates a job and runs the pipeline for it in a background task.
    ///
    /// Returns as soon as the `processing` record is written; the task's
    /// terminal store write is its only observable completion signal. Rejected
    /// terminal writes are retried; a result that cannot be stored is recorded
    /// as a failure instead. The task drops its own handle when done.
    ///
    /// # Errors
    ///
    /// Same as [`JobManager::create`].
    pub async fn start(self: &Arc<Self>, topic: &str, pipeline: Arc<ContentPipeline>) -> Result<JobId> {
        let id = self.create(topic).await?;
        let topic = topic.trim().to_string();
        let manager = Arc::clone(self);
        let (registered_tx, registered_rx) = oneshot::channel::<()>();

        let task = async move {
            // The handle must be in the table before the task can remove it.
            let _ = registered_rx.await;
            let notifier = ProgressNotifier::with_sink(Arc::new(LoggingSink::debug()));
            let outcome = pipeline.run(&topic, &notifier).await;
            manager.record_outcome(&id, outcome).await;
            manager.tasks.remove(&id);
        };

        let handle = tokio::spawn(task.instrument(info_span!("job", job_id = %id)));
        self.tasks.insert(id, handle);
        let _ = registered_tx.send(());
        Ok(id)
    }

    /// Reads a job.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, or a storage error.
    pub async fn get(&self, id: &JobId) -> Result<Job> {
        self.store.get(id).await?.ok_or(ContentflowError::NotFound(*id))
    }

    /// Records a successful run.
    ///
    /// # Errors
    ///
    /// `JobAlreadyTerminal` if the job already completed or failed, `NotFound`
    /// for an unknown id, or a storage error.
    pub async fn complete(&self, id: &JobId, result: ContentResult) -> Result<Job> {
        self.finish(id, |job| job.completed(result)).await
    }

    /// Records a failed run.
    ///
    /// # Errors
    ///
    /// Same as [`JobManager::complete`].
    pub async fn fail(&self, id: &JobId, error: impl Into<String>) -> Result<Job> {
        let error = error.into();
        self.finish(id, |job| job.failed(error)).await
    }

    /// Waits for a job's background task and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the task panicked, or the errors of [`JobManager::get`].
    pub async fn wait(&self, id: &JobId) -> Result<Job> {
        if let Some((_, handle)) = self.tasks.remove(id) {
            handle
                .await
                .map_err(|e| ContentflowError::Internal(format!("Job task for {id} failed: {e}")))?;
        }
        self.get(id).await
    }

    /// Waits for every background task started so far. Returns how many were awaited.
    pub async fn drain(&self) -> usize {
        let ids: Vec<JobId> = self.tasks.iter().map(|entry| *entry.key()).collect();
        let handles: Vec<JoinHandle<()>> = ids
            .iter()
            .filter_map(|id| self.tasks.remove(id).map(|(_, handle)| handle))
            .collect();
        let count = handles.len();

        for outcome in join_all(handles).await {
            if let Err(err) = outcome {
                warn!(error = %err, "Job task ended abnormally");
            }
        }
        count
    }

    async fn take_in_flight(&self, id: &JobId) -> Result<Job> {
        if let Some((_, job)) = self.in_flight.remove(id) {
            return Ok(job);
        }
        // Stored but no longer in flight: either terminal already, or another
        // caller holds the terminal write.
        match self.store.get(id).await? {
            Some(_) => Err(ContentflowError::JobAlreadyTerminal(*id)),
            None => Err(ContentflowError::NotFound(*id)),
        }
    }

    async fn finish(&self, id: &JobId, terminal: impl FnOnce(Job) -> Job) -> Result<Job> {
        let job = self.take_in_flight(id).await?;
        let done = terminal(job.clone());
        match self.store.put(&done).await {
            Ok(()) => {
                info!(job_id = %done.job_id, status = %done.status, "Job finished");
                Ok(done)
            }
            Err(err) => {
                self.in_flight.insert(*id, job);
                Err(err.into())
            }
        }
    }

    async fn finish_with_retry(&self, id: &JobId, terminal: impl Fn(Job) -> Job) -> Result<Job> {
        let mut attempt = 1;
        loop {
            match self.finish(id, &terminal).await {
                Err(err @ ContentflowError::Storage(_)) if attempt < TERMINAL_WRITE_ATTEMPTS => {
                    warn!(attempt, error = %err, "Terminal job write failed, retrying");
                    tokio::time::sleep(TERMINAL_RETRY_DELAY * attempt).await;
                    attempt += 1;
                }
                written => return written,
            }
        }
    }

    async fn record_outcome(&self, id: &JobId, outcome: Result<ContentResult>) {
        let error = match outcome {
            Ok(result) => match self.finish_with_retry(id, |job| job.completed(result.clone())).await {
                Ok(_) => return,
                Err(err) => format!("Failed to store job result: {err}"),
            },
            Err(err) => err.to_string(),
        };
        if let Err(err) = self.finish_with_retry(id, |job| job.failed(error.clone())).await {
            error!(error = %err, "Terminal job write failed; job stays processing");
        }
    }
}
