use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use text2midi_core::error::{
    CoreError, MSG_ARTIFACT_MISSING, MSG_JOB_NOT_FOUND, MSG_NOT_COMPLETE,
};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `text2midi_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A filesystem error while managing scratch space or artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::JobNotFound(_) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    MSG_JOB_NOT_FOUND.to_string(),
                ),
                CoreError::ArtifactMissing(id) => {
                    tracing::warn!(job_id = %id, "Completed job has no MIDI file on disk");
                    (
                        StatusCode::NOT_FOUND,
                        "NOT_FOUND",
                        MSG_ARTIFACT_MISSING.to_string(),
                    )
                }
                CoreError::NotComplete(_) => (
                    StatusCode::BAD_REQUEST,
                    "NOT_COMPLETE",
                    MSG_NOT_COMPLETE.to_string(),
                ),
                CoreError::JobFailed { reason, .. } => (
                    StatusCode::BAD_REQUEST,
                    "JOB_FAILED",
                    format!("MIDI generation failed: {reason}"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        INTERNAL_MESSAGE.to_string(),
                    )
                }
            },

            // --- Filesystem errors ---
            AppError::Io(err) => {
                tracing::error!(error = %err, "I/O error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
