use crate::types::JobId;

/// Message returned for unknown job identifiers.
pub const MSG_JOB_NOT_FOUND: &str = "Job ID not found.";

/// Message returned when a completed job's artifact is gone from disk.
pub const MSG_ARTIFACT_MISSING: &str = "MIDI file not found.";

/// Message returned while a job is still being processed.
pub const MSG_NOT_COMPLETE: &str = "MIDI generation is not complete yet.";

/// Message returned when a submission carries no usable text.
pub const MSG_TEXT_REQUIRED: &str = "Text input is required.";

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Carries the raw identifier, which may not even be a valid UUID.
    #[error("Job ID not found: {0}")]
    JobNotFound(String),

    #[error("MIDI file not found for job {0}")]
    ArtifactMissing(JobId),

    #[error("MIDI generation is not complete yet for job {0}")]
    NotComplete(JobId),

    #[error("MIDI generation failed for job {id}: {reason}")]
    JobFailed { id: JobId, reason: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
