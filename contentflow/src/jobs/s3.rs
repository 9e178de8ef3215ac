//! S3-backed job store.

use super::{Job, JobId, JobStore, JobStoreError};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use tracing::debug;

/// Job store keeping each record as `jobs/{id}.json` in a bucket.
#[derive(Debug, Clone)]
pub struct S3JobStore {
    client: S3Client,
    bucket: String,
    prefix: String,
}

impl S3JobStore {
    /// Creates a store over an existing client.
    #[must_use]
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: "jobs/".to_string(),
        }
    }

    /// Creates a store using credentials and region from the environment.
    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::new(S3Client::new(&config), bucket)
    }

    /// Returns the bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns the object key for a job.
    #[must_use]
    pub fn key_for(&self, id: &JobId) -> String {
        format!("{}{id}.json", self.prefix)
    }
}

#[async_trait]
impl JobStore for S3JobStore {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn put(&self, job: &Job) -> Result<(), JobStoreError> {
        let key = self.key_for(&job.job_id);
        let body = serde_json::to_vec(job)?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| JobStoreError::Backend(format!("Failed to write {key}: {e}")))?;

        debug!(job_id = %job.job_id, bucket = %self.bucket, key = %key, "Job record uploaded");
        Ok(())
    }

    async fn get(&self, id: &JobId) -> Result<Option<Job>, JobStoreError> {
        let key = self.key_for(id);
        let output = match self.client.get_object().bucket(&self.bucket).key(&key).send().await {
            Ok(output) => output,
            Err(err) => {
                if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                    return Ok(None);
                }
                return Err(JobStoreError::Backend(format!("Failed to read {key}: {err}")));
            }
        };

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| JobStoreError::Backend(format!("Failed to read body of {key}: {e}")))?
            .into_bytes();

        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}
