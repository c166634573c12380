//! Text-to-MIDI conversion boundary.
//!
//! The service does not generate music itself. It hands the prompt to a
//! [`Converter`], which writes a MIDI file and reports where it is along
//! with descriptive metadata. Conversion is synchronous and may take a long
//! time, so callers run it off the async executor.

pub mod command;

use std::path::PathBuf;

use crate::job::{JobResult, Metadata};

pub use command::CommandConverter;

/// Metadata key under which converters report the artifact location.
///
/// It is an internal detail and is never exposed to API clients.
pub const METADATA_PATH_KEY: &str = "file_path";

/// Input for a single conversion.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// The user's prompt.
    pub text: String,
    /// Scratch directory reserved for this conversion.
    pub output_dir: PathBuf,
}

/// What a converter produced.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub artifact_path: PathBuf,
    pub metadata: Metadata,
}

impl ConversionOutput {
    /// Turn the raw output into a storable result, dropping the internal
    /// path field from the metadata.
    pub fn into_job_result(self) -> JobResult {
        let mut metadata = self.metadata;
        metadata.remove(METADATA_PATH_KEY);
        JobResult {
            metadata,
            artifact_path: self.artifact_path,
        }
    }
}

/// Error type for conversion attempts.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("converter command is empty")]
    InvalidCommand,

    #[error("failed to launch converter: {0}")]
    Spawn(std::io::Error),

    #[error("converter {}: {stderr}", describe_exit(.exit_code))]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to parse converter output: {0}")]
    Parse(String),

    #[error("converter did not report a MIDI file path")]
    MissingArtifact,

    #[error("conversion failed: {0}")]
    Failed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exited with code {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

/// A text-to-MIDI backend.
///
/// Implementations must tolerate concurrent calls from several blocking
/// threads.
pub trait Converter: Send + Sync {
    fn convert(&self, request: &ConversionRequest) -> Result<ConversionOutput, ConvertError>;
}

impl<F> Converter for F
where
    F: Fn(&ConversionRequest) -> Result<ConversionOutput, ConvertError> + Send + Sync,
{
    fn convert(&self, request: &ConversionRequest) -> Result<ConversionOutput, ConvertError> {
        self(request)
    }
}
