//! Route definitions for the job endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

/// Job routes, mounted at the root.
///
/// ```text
/// POST   /submit-text               -> submit_text
/// GET    /check-status/{job_id}     -> check_status
/// GET    /get-result/{job_id}       -> get_result
/// GET    /download-midi/{job_id}    -> download_midi
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/submit-text", post(jobs::submit_text))
        .route("/check-status/{job_id}", get(jobs::check_status))
        .route("/get-result/{job_id}", get(jobs::get_result))
        .route("/download-midi/{job_id}", get(jobs::download_midi))
}
