#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use text2midi_api::config::ServerConfig;
use text2midi_api::router::build_app_router;
use text2midi_api::state::AppState;
use text2midi_core::converter::{ConversionOutput, ConversionRequest, ConvertError, Converter};
use text2midi_core::job::Metadata;

/// Bytes written as the "generated" MIDI file.
pub const MIDI_BYTES: &[u8] = b"MThd\x00\x00\x00\x06\x00\x01\x00\x01\x01\xe0MTrk\x00\x00\x00\x04\x00\xff\x2f\x00";

/// Prompts containing this marker block until [`Gate::open`] is called.
pub const HOLD_MARKER: &str = "[hold]";

/// Prompts containing this marker make the converter fail.
pub const FAIL_MARKER: &str = "[fail]";

/// A latch that held conversions wait on.
pub struct Gate {
    open: Mutex<bool>,
    cond: Condvar,
}

impl Gate {
    pub fn new() -> Self {
        Self {
            open: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.cond.notify_all();
    }

    fn wait(&self) {
        let guard = self.open.lock().unwrap();
        // Bounded so a broken test can never wedge the runtime on drop.
        let _ = self
            .cond
            .wait_timeout_while(guard, Duration::from_secs(10), |open| !*open)
            .unwrap();
    }
}

/// Converter that writes [`MIDI_BYTES`] into the job's scratch directory.
pub struct ScriptedConverter {
    gate: Arc<Gate>,
}

impl Converter for ScriptedConverter {
    fn convert(&self, request: &ConversionRequest) -> Result<ConversionOutput, ConvertError> {
        if request.text.contains(HOLD_MARKER) {
            self.gate.wait();
        }
        if request.text.contains(FAIL_MARKER) {
            return Err(ConvertError::Failed("model rejected the prompt".into()));
        }

        let artifact_path = request.output_dir.join("song.mid");
        std::fs::write(&artifact_path, MIDI_BYTES)?;

        let mut metadata = Metadata::new();
        metadata.insert(
            "file_path".into(),
            serde_json::json!(artifact_path.display().to_string()),
        );
        metadata.insert("tracks".into(), serde_json::json!(1));
        metadata.insert("prompt".into(), serde_json::json!(request.text));

        Ok(ConversionOutput {
            artifact_path,
            metadata,
        })
    }
}

/// A fully wired application backed by a temporary storage root.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub gate: Arc<Gate>,
    pub storage: TempDir,
}

impl TestApp {
    pub fn generation_dir(&self) -> PathBuf {
        self.state.workspace.generation_dir().to_path_buf()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.gate.open();
    }
}

/// Build a test `ServerConfig` with safe defaults rooted at `storage_root`.
pub fn test_config(storage_root: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        converter_config_path: storage_root.join("config/main_config.yaml"),
        storage_root,
        converter_command: "unused".to_string(),
        job_timeout_secs: None,
    }
}

/// Build the full application router with all middleware layers around a
/// [`ScriptedConverter`].
pub async fn build_test_app() -> TestApp {
    let gate = Arc::new(Gate::new());
    let converter = ScriptedConverter {
        gate: Arc::clone(&gate),
    };
    build_test_app_with(Arc::new(converter), gate).await
}

/// Same as [`build_test_app`] but around an arbitrary converter.
pub async fn build_test_app_with(converter: Arc<dyn Converter>, gate: Arc<Gate>) -> TestApp {
    let storage = tempfile::tempdir().unwrap();
    let config = test_config(storage.path().join("storage"));

    let state = AppState::new(config.clone(), converter);
    state.workspace.reset().await.unwrap();
    let router = build_app_router(state.clone(), &config);

    TestApp {
        router,
        state,
        gate,
        storage,
    }
}

pub async fn get(app: &TestApp, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn post_raw(app: &TestApp, uri: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &TestApp, uri: &str, body: serde_json::Value) -> Response {
    post_raw(app, uri, &body.to_string()).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Submit `text` and return the new job id.
pub async fn submit(app: &TestApp, text: &str) -> String {
    let response = post_json(app, "/submit-text", serde_json::json!({ "text": text })).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    json["jobId"].as_str().unwrap().to_string()
}

/// Poll the status endpoint until the job reports `expected`.
pub async fn wait_for_status(app: &TestApp, job_id: &str, expected: &str) -> serde_json::Value {
    for _ in 0..200 {
        let response = get(app, &format!("/check-status/{job_id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        if json["status"] == expected {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("job {job_id} never reached status '{expected}'");
}
