//! Job store trait and local backends.

use super::{Job, JobId};
use async_trait::async_trait;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised by a job store backend.
#[derive(Debug, Error)]
pub enum JobStoreError {
    /// Reading or writing the underlying medium failed.
    #[error("Job store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record could not be encoded or decoded.
    #[error("Job record is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The remote backend rejected the request.
    #[error("Job store backend error: {0}")]
    Backend(String),
}

/// Durable key-value storage for job records.
///
/// Writes are whole-record overwrites keyed by job id; backends never merge.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Returns a short backend name for logs.
    fn name(&self) -> &'static str;

    /// Writes (or overwrites) a job record.
    async fn put(&self, job: &Job) -> Result<(), JobStoreError>;

    /// Reads a job record.
    async fn get(&self, id: &JobId) -> Result<Option<Job>, JobStoreError>;
}

/// Process-local job store.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: DashMap<JobId, Job>,
}

impl InMemoryJobStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Returns true if no jobs are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, job: &Job) -> Result<(), JobStoreError> {
        self.jobs.insert(job.job_id, job.clone());
        Ok(())
    }

    async fn get(&self, id: &JobId) -> Result<Option<Job>, JobStoreError> {
        Ok(self.jobs.get(id).map(|entry| entry.value().clone()))
    }
}

/// Job store keeping one JSON file per job in a directory.
///
/// Records are written to a temporary file and renamed into place, so a
/// reader never observes a partially written record.
#[derive(Debug, Clone)]
pub struct FileJobStore {
    dir: PathBuf,
}

impl FileJobStore {
    /// Opens (and creates, if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, JobStoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Returns the store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &JobId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

#[async_trait]
impl JobStore for FileJobStore {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn put(&self, job: &Job) -> Result<(), JobStoreError> {
        let path = self.path_for(&job.job_id);
        let tmp = self.dir.join(format!(".{}.{}.tmp", job.job_id, job.status));
        let body = serde_json::to_vec_pretty(job)?;

        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(job_id = %job.job_id, path = %path.display(), "Job record written");
        Ok(())
    }

    async fn get(&self, id: &JobId) -> Result<Option<Job>, JobStoreError> {
        match tokio::fs::read(self.path_for(id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_in_memory_put_get_overwrite() {
        let store = InMemoryJobStore::new();
        let job = Job::processing(JobId::new(), "Rust");

        assert!(store.get(&job.job_id).await.unwrap().is_none());
        store.put(&job).await.unwrap();
        assert_eq!(store.get(&job.job_id).await.unwrap(), Some(job.clone()));

        let failed = job.clone().failed("boom");
        store.put(&failed).await.unwrap();
        assert_eq!(store.get(&job.job_id).await.unwrap(), Some(failed));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileJobStore::open(dir.path().join("jobs")).await.unwrap();
        let job = Job::processing(JobId::new(), "Rust");

        assert!(store.get(&job.job_id).await.unwrap().is_none());
        store.put(&job).await.unwrap();
        assert_eq!(store.get(&job.job_id).await.unwrap(), Some(job.clone()));

        let failed = job.clone().failed("boom");
        store.put(&failed).await.unwrap();
        assert_eq!(store.get(&job.job_id).await.unwrap(), Some(failed));

        let files: Vec<_> = std::fs::read_dir(store.dir()).unwrap().collect();
        assert_eq!(files.len(), 1, "temporary files should be renamed away");
    }

    #[tokio::test]
    async fn test_file_store_rejects_corrupt_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileJobStore::open(dir.path()).await.unwrap();
        let id = JobId::new();
        std::fs::write(dir.path().join(format!("{id}.json")), b"{not json").unwrap();

        assert!(matches!(store.get(&id).await, Err(JobStoreError::Serialization(_))));
    }
}
