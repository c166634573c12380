//! Job record and lifecycle.
//!
//! A job is created in the `submitted` state and makes exactly one
//! transition, to either `completed` or `failed`. The terminal payload
//! (result or error) is carried by [`JobState`] so a record can never hold
//! both, or hold one before it is terminal.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{JobId, Timestamp};

/// Opaque description of a generated artifact (duration, track count, ...).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Externally visible job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Submitted,
    Completed,
    Failed,
}

impl JobStatus {
    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Submitted)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a successful conversion, as stored on the job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobResult {
    /// Artifact metadata with internal path fields already removed.
    pub metadata: Metadata,
    /// Location of the generated MIDI file.
    pub artifact_path: PathBuf,
}

/// Lifecycle state together with its terminal payload.
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    Submitted,
    Completed(JobResult),
    Failed(String),
}

/// A single text-to-MIDI job.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub state: JobState,
    pub submitted_at: Timestamp,
    pub finished_at: Option<Timestamp>,
}

impl Job {
    /// A freshly submitted job.
    pub fn submitted(id: JobId) -> Self {
        Self {
            id,
            state: JobState::Submitted,
            submitted_at: chrono::Utc::now(),
            finished_at: None,
        }
    }

    pub fn status(&self) -> JobStatus {
        match self.state {
            JobState::Submitted => JobStatus::Submitted,
            JobState::Completed(_) => JobStatus::Completed,
            JobState::Failed(_) => JobStatus::Failed,
        }
    }

    pub fn result(&self) -> Option<&JobResult> {
        match &self.state {
            JobState::Completed(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            JobState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Transition `submitted -> completed`.
    pub fn complete(&mut self, result: JobResult) -> Result<(), CoreError> {
        self.finish(JobState::Completed(result))
    }

    /// Transition `submitted -> failed`.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), CoreError> {
        self.finish(JobState::Failed(message.into()))
    }

    /// Return the stored result, or the error a reader should see when the
    /// job has not (successfully) finished.
    pub fn require_result(&self) -> Result<&JobResult, CoreError> {
        match &self.state {
            JobState::Completed(result) => Ok(result),
            JobState::Submitted => Err(CoreError::NotComplete(self.id)),
            JobState::Failed(reason) => Err(CoreError::JobFailed {
                id: self.id,
                reason: reason.clone(),
            }),
        }
    }

    fn finish(&mut self, next: JobState) -> Result<(), CoreError> {
        let current = self.status();
        if current.is_terminal() {
            return Err(CoreError::Conflict(format!(
                "Job {} is already {current}",
                self.id
            )));
        }
        self.state = next;
        self.finished_at = Some(chrono::Utc::now());
        Ok(())
    }
}
