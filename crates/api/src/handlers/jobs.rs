//! Handlers for the text-to-MIDI job endpoints.
//!
//! Submission registers a job and hands the prompt to the runner; the other
//! endpoints only read the job store (and, for downloads, the artifact).

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use text2midi_core::error::{CoreError, MSG_TEXT_REQUIRED};
use text2midi_core::job::{Job, JobStatus, Metadata};
use text2midi_core::types::{new_job_id, parse_job_id, JobId};
use tokio_util::io::ReaderStream;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Content type served for generated artifacts.
const MIDI_CONTENT_TYPE: &str = "audio/midi";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /submit-text`.
#[derive(Debug, Deserialize)]
pub struct SubmitText {
    #[serde(default)]
    pub text: Option<String>,
}

/// `{ jobId, status }`, plus the failure message for failed jobs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub job_id: JobId,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Job> for JobStatusResponse {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id,
            status: job.status(),
            error: job.error().map(str::to_string),
        }
    }
}

/// `{ jobId, status, metaData }` for completed jobs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResultResponse {
    pub job_id: JobId,
    pub status: JobStatus,
    pub meta_data: Metadata,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a job by its raw path segment.
///
/// Malformed identifiers are reported exactly like unknown ones.
async fn find_job(state: &AppState, raw_id: &str) -> AppResult<Job> {
    let not_found = || AppError::Core(CoreError::JobNotFound(raw_id.to_string()));
    let id = parse_job_id(raw_id).ok_or_else(not_found)?;
    state.store.get(id).await.ok_or_else(not_found)
}

/// Attachment file name for an artifact path.
fn attachment_name(path: &FsPath, id: JobId) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.replace(['"', '\\'], "_"))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("{id}.mid"))
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /submit-text
///
/// Register a job for the given prompt and start converting it in the
/// background. Returns 202 immediately; a missing, empty or unreadable
/// body is rejected with 400 and no job is created.
pub async fn submit_text(
    State(state): State<AppState>,
    payload: Result<Json<SubmitText>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let text = match payload {
        Ok(Json(SubmitText { text: Some(text) })) if !text.is_empty() => text,
        Ok(_) => return Err(CoreError::Validation(MSG_TEXT_REQUIRED.into()).into()),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Rejected submit body");
            return Err(CoreError::Validation(MSG_TEXT_REQUIRED.into()).into());
        }
    };

    let id = new_job_id();
    let job = state.store.create(id).await?;

    // The job is registered as running before the sweep, so its directory
    // can never be reclaimed by a concurrent submission.
    let store = Arc::clone(&state.store);
    let prepared = state
        .workspace
        .prepare_job(id, || async move { store.active_ids().await })
        .await;

    let (output_dir, swept) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            if let Err(fail_err) = state
                .store
                .fail(id, format!("Could not prepare scratch space: {e}"))
                .await
            {
                tracing::warn!(job_id = %id, error = %fail_err, "Could not record job failure");
            }
            return Err(e.into());
        }
    };

    if swept > 0 {
        tracing::debug!(swept, "Reclaimed scratch space of finished jobs");
    }

    state.runner.submit(id, text, output_dir);

    tracing::info!(job_id = %id, "Job submitted");

    Ok((StatusCode::ACCEPTED, Json(JobStatusResponse::from(&job))))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// GET /check-status/{job_id}
pub async fn check_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<JobStatusResponse>> {
    let job = find_job(&state, &job_id).await?;
    Ok(Json(JobStatusResponse::from(&job)))
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// GET /get-result/{job_id}
///
/// Returns the artifact metadata of a completed job. Running jobs yield
/// 400 `NOT_COMPLETE`, failed jobs 400 `JOB_FAILED`.
pub async fn get_result(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<JobResultResponse>> {
    let job = find_job(&state, &job_id).await?;
    let result = job.require_result()?;

    Ok(Json(JobResultResponse {
        job_id: job.id,
        status: job.status(),
        meta_data: result.metadata.clone(),
    }))
}

// ---------------------------------------------------------------------------
// Download
// ---------------------------------------------------------------------------

/// GET /download-midi/{job_id}
///
/// Streams the generated MIDI file as an attachment. A completed job whose
/// file has since disappeared yields 404.
pub async fn download_midi(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Response> {
    let job = find_job(&state, &job_id).await?;
    let path = job.require_result()?.artifact_path.clone();

    let file_size = match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => meta.len(),
        Ok(_) => return Err(CoreError::ArtifactMissing(job.id).into()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CoreError::ArtifactMissing(job.id).into())
        }
        Err(e) => return Err(e.into()),
    };

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CoreError::ArtifactMissing(job.id).into())
        }
        Err(e) => return Err(e.into()),
    };

    let disposition = format!(
        "attachment; filename=\"{}\"",
        attachment_name(&path, job.id)
    );

    tracing::debug!(job_id = %job.id, file_size, "Serving MIDI file");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, MIDI_CONTENT_TYPE)
        .header(header::CONTENT_LENGTH, file_size.to_string())
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| AppError::InternalError(e.to_string()))
}
