use std::collections::{HashMap, HashSet};

use serde::Serialize;
use text2midi_core::error::CoreError;
use text2midi_core::job::{Job, JobResult, JobStatus};
use text2midi_core::types::JobId;
use tokio::sync::RwLock;

/// Per-status job counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobCounts {
    pub total: usize,
    pub submitted: usize,
    pub completed: usize,
    pub failed: usize,
}

/// In-memory registry of every job submitted since start-up.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared between request handlers and the job runner. Readers always get
/// a clone of the record. Records are never evicted.
#[derive(Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl JobStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job in the `submitted` state.
    pub async fn create(&self, id: JobId) -> Result<Job, CoreError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&id) {
            return Err(CoreError::Conflict(format!("Job {id} already exists")));
        }
        let job = Job::submitted(id);
        jobs.insert(id, job.clone());
        Ok(job)
    }

    /// Look up a job by ID.
    pub async fn get(&self, id: JobId) -> Option<Job> {
        self.jobs.read().await.get(&id).cloned()
    }

    /// Mark a job completed. Fails if the job is unknown or already terminal.
    pub async fn complete(&self, id: JobId, result: JobResult) -> Result<Job, CoreError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or_else(|| CoreError::JobNotFound(id.to_string()))?;
        job.complete(result)?;
        Ok(job.clone())
    }

    /// Mark a job failed. Fails if the job is unknown or already terminal.
    pub async fn fail(&self, id: JobId, message: impl Into<String>) -> Result<Job, CoreError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or_else(|| CoreError::JobNotFound(id.to_string()))?;
        job.fail(message)?;
        Ok(job.clone())
    }

    /// IDs of all jobs still in the `submitted` state.
    pub async fn active_ids(&self) -> HashSet<JobId> {
        self.jobs
            .read()
            .await
            .values()
            .filter(|job| job.status() == JobStatus::Submitted)
            .map(|job| job.id)
            .collect()
    }

    /// Return the number of known jobs.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    /// Count jobs by status.
    pub async fn counts(&self) -> JobCounts {
        let jobs = self.jobs.read().await;
        let mut counts = JobCounts {
            total: jobs.len(),
            ..JobCounts::default()
        };
        for job in jobs.values() {
            match job.status() {
                JobStatus::Submitted => counts.submitted += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }
}
