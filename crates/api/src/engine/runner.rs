//! Background execution of text-to-MIDI jobs.
//!
//! Every submission gets its own tracked Tokio task. The converter call is
//! synchronous, so it runs on the blocking pool while the task waits for it
//! alongside the shutdown token and the optional time limit.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use text2midi_core::converter::{ConversionOutput, ConversionRequest, ConvertError, Converter};
use text2midi_core::job::JobResult;
use text2midi_core::types::JobId;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::engine::store::JobStore;

/// Failure message recorded for jobs cut short by shutdown.
pub const MSG_INTERRUPTED: &str = "MIDI generation was interrupted by server shutdown.";

pub struct JobRunner {
    store: Arc<JobStore>,
    converter: Arc<dyn Converter>,
    cancel: CancellationToken,
    tracker: TaskTracker,
    job_timeout: Option<Duration>,
}

impl JobRunner {
    /// Create a runner with no per-job time limit.
    pub fn new(store: Arc<JobStore>, converter: Arc<dyn Converter>) -> Self {
        Self {
            store,
            converter,
            cancel: CancellationToken::new(),
            tracker: TaskTracker::new(),
            job_timeout: None,
        }
    }

    pub fn with_job_timeout(mut self, job_timeout: Option<Duration>) -> Self {
        self.job_timeout = job_timeout;
        self
    }

    /// Number of job tasks that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Start converting `text` for job `id` in the background.
    ///
    /// Returns immediately. The job must already exist in the store. The
    /// returned handle may be dropped; the outcome is written to the store.
    pub fn submit(&self, id: JobId, text: String, output_dir: PathBuf) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let converter = Arc::clone(&self.converter);
        let cancel = self.cancel.clone();
        let job_timeout = self.job_timeout;
        let request = ConversionRequest { text, output_dir };

        self.tracker.spawn(async move {
            run_job(store, converter, cancel, job_timeout, id, request).await;
        })
    }

    /// Interrupt running jobs and wait up to `grace` for their tasks to
    /// record the outcome. Returns `false` if the grace period ran out.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.cancel.cancel();
        self.tracker.close();
        tokio::time::timeout(grace, self.tracker.wait()).await.is_ok()
    }
}

async fn run_job(
    store: Arc<JobStore>,
    converter: Arc<dyn Converter>,
    cancel: CancellationToken,
    job_timeout: Option<Duration>,
    id: JobId,
    request: ConversionRequest,
) {
    tracing::info!(job_id = %id, "MIDI generation started");

    let conversion = tokio::task::spawn_blocking(move || converter.convert(&request));

    let outcome = tokio::select! {
        _ = cancel.cancelled() => Err(MSG_INTERRUPTED.to_string()),
        outcome = await_conversion(conversion, job_timeout) => outcome,
    };

    match outcome {
        Ok(result) => {
            let artifact = result.artifact_path.display().to_string();
            match store.complete(id, result).await {
                Ok(_) => tracing::info!(job_id = %id, artifact = %artifact, "MIDI generation completed"),
                Err(e) => tracing::warn!(job_id = %id, error = %e, "Could not record job completion"),
            }
        }
        Err(message) => {
            tracing::warn!(job_id = %id, error = %message, "MIDI generation failed");
            if let Err(e) = store.fail(id, message).await {
                tracing::warn!(job_id = %id, error = %e, "Could not record job failure");
            }
        }
    }
}

/// Wait for the blocking conversion, honouring the optional time limit.
///
/// A timed-out conversion keeps running on its blocking thread; only its
/// result is discarded.
async fn await_conversion(
    conversion: JoinHandle<Result<ConversionOutput, ConvertError>>,
    job_timeout: Option<Duration>,
) -> Result<JobResult, String> {
    match job_timeout {
        Some(limit) => match tokio::time::timeout(limit, conversion).await {
            Ok(joined) => into_outcome(joined),
            Err(_) => Err(format!(
                "MIDI generation timed out after {} seconds.",
                limit.as_secs()
            )),
        },
        None => into_outcome(conversion.await),
    }
}

fn into_outcome(
    joined: Result<Result<ConversionOutput, ConvertError>, JoinError>,
) -> Result<JobResult, String> {
    match joined {
        Ok(Ok(output)) => Ok(output.into_job_result()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(format!("MIDI generation task panicked: {e}")),
    }
}
