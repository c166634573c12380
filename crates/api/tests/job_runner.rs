//! Tests for `JobRunner`.
//!
//! The runner is driven with closure converters; each test awaits the
//! handle returned by `submit` so the outcome is recorded before asserting.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use text2midi_api::engine::runner::{JobRunner, MSG_INTERRUPTED};
use text2midi_api::engine::store::JobStore;
use text2midi_core::converter::{ConversionOutput, ConversionRequest, ConvertError, Converter};
use text2midi_core::job::{JobStatus, Metadata};
use text2midi_core::types::new_job_id;

type Outcome = Result<ConversionOutput, ConvertError>;

fn output_for(request: &ConversionRequest) -> ConversionOutput {
    let artifact_path = request.output_dir.join("out.mid");
    let mut metadata = Metadata::new();
    metadata.insert(
        "file_path".into(),
        serde_json::json!(artifact_path.display().to_string()),
    );
    metadata.insert("duration".into(), serde_json::json!(31.5));
    ConversionOutput {
        artifact_path,
        metadata,
    }
}

fn runner_with<C: Converter + 'static>(converter: C) -> (Arc<JobStore>, JobRunner) {
    let store = Arc::new(JobStore::new());
    let runner = JobRunner::new(Arc::clone(&store), Arc::new(converter));
    (store, runner)
}

// ---------------------------------------------------------------------------
// Test: success is recorded with the path stripped from metadata
// ---------------------------------------------------------------------------

#[tokio::test]
async fn successful_conversion_completes_job() {
    let (store, runner) = runner_with(|request: &ConversionRequest| -> Outcome { Ok(output_for(request)) });
    let id = new_job_id();
    store.create(id).await.unwrap();

    runner
        .submit(id, "jazz".into(), PathBuf::from("/scratch/job"))
        .await
        .unwrap();

    let job = store.get(id).await.unwrap();
    assert_eq!(job.status(), JobStatus::Completed);
    let result = job.result().unwrap();
    assert_eq!(result.artifact_path, PathBuf::from("/scratch/job/out.mid"));
    assert!(!result.metadata.contains_key("file_path"));
    assert_eq!(result.metadata["duration"], serde_json::json!(31.5));
}

// ---------------------------------------------------------------------------
// Test: failures and panics become failed jobs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn converter_error_fails_job() {
    let (store, runner) = runner_with(|_: &ConversionRequest| -> Outcome {
        Err(ConvertError::Failed("no melody found".into()))
    });
    let id = new_job_id();
    store.create(id).await.unwrap();

    runner
        .submit(id, "silence".into(), PathBuf::from("/scratch"))
        .await
        .unwrap();

    let job = store.get(id).await.unwrap();
    assert_eq!(job.status(), JobStatus::Failed);
    assert_eq!(job.error(), Some("conversion failed: no melody found"));
}

#[tokio::test]
async fn converter_panic_fails_job() {
    let (store, runner) = runner_with(|_: &ConversionRequest| -> Outcome {
        panic!("converter bug")
    });
    let id = new_job_id();
    store.create(id).await.unwrap();

    runner
        .submit(id, "anything".into(), PathBuf::from("/scratch"))
        .await
        .unwrap();

    let job = store.get(id).await.unwrap();
    assert_eq!(job.status(), JobStatus::Failed);
    assert!(job.error().unwrap().starts_with("MIDI generation task panicked"));
}

// ---------------------------------------------------------------------------
// Test: the optional time limit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn slow_conversion_times_out_when_limit_is_set() {
    let store = Arc::new(JobStore::new());
    let slow = |request: &ConversionRequest| -> Outcome {
        std::thread::sleep(Duration::from_millis(500));
        Ok(output_for(request))
    };
    let runner = JobRunner::new(Arc::clone(&store), Arc::new(slow))
        .with_job_timeout(Some(Duration::from_millis(20)));
    let id = new_job_id();
    store.create(id).await.unwrap();

    runner
        .submit(id, "epic".into(), PathBuf::from("/scratch"))
        .await
        .unwrap();

    let job = store.get(id).await.unwrap();
    assert_eq!(job.status(), JobStatus::Failed);
    assert!(job.error().unwrap().contains("timed out"));
}

// ---------------------------------------------------------------------------
// Test: shutdown interrupts in-flight jobs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_interrupts_running_jobs() {
    let (store, runner) = runner_with(|request: &ConversionRequest| -> Outcome {
        std::thread::sleep(Duration::from_millis(300));
        Ok(output_for(request))
    });
    let id = new_job_id();
    store.create(id).await.unwrap();

    let handle = runner.submit(id, "opera".into(), PathBuf::from("/scratch"));
    assert_eq!(runner.in_flight(), 1);

    assert!(runner.shutdown(Duration::from_secs(5)).await);
    handle.await.unwrap();

    let job = store.get(id).await.unwrap();
    assert_eq!(job.status(), JobStatus::Failed);
    assert_eq!(job.error(), Some(MSG_INTERRUPTED));
    assert_eq!(runner.in_flight(), 0);
}

// ---------------------------------------------------------------------------
// Test: many jobs run side by side
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn jobs_run_concurrently_and_independently() {
    let (store, runner) = runner_with(|request: &ConversionRequest| -> Outcome {
        if request.text.ends_with('3') {
            Err(ConvertError::Failed("unlucky".into()))
        } else {
            Ok(output_for(request))
        }
    });

    let mut ids = Vec::new();
    let mut handles = Vec::new();
    for i in 0..8 {
        let id = new_job_id();
        store.create(id).await.unwrap();
        handles.push(runner.submit(id, format!("song {i}"), PathBuf::from(format!("/scratch/{i}"))));
        ids.push(id);
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for (i, id) in ids.into_iter().enumerate() {
        let job = store.get(id).await.unwrap();
        let expected = if i == 3 {
            JobStatus::Failed
        } else {
            JobStatus::Completed
        };
        assert_eq!(job.status(), expected, "job {i}");
    }
}
