pub mod health;
pub mod jobs;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                        service health + job counters
/// /submit-text                   submit a prompt (POST)
/// /check-status/{job_id}         job status
/// /get-result/{job_id}           metadata of a completed job
/// /download-midi/{job_id}        generated MIDI file
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(jobs::router())
}
