//! Asynchronous jobs.
//!
//! A [`Job`] tracks one background pipeline run. [`JobManager`] owns the
//! lifecycle (create, run, exactly one terminal write); a [`JobStore`]
//! persists the records.

mod manager;
mod model;
#[cfg(feature = "s3")]
mod s3;
mod store;

pub use manager::JobManager;
pub use model::{Job, JobId, JobStatus};
#[cfg(feature = "s3")]
pub use s3::S3JobStore;
pub use store::{FileJobStore, InMemoryJobStore, JobStore, JobStoreError};
