//! Converter backed by an external program.
//!
//! The program receives the prompt on stdin and two flags,
//! `--config <path>` and `--output-dir <dir>`. On success it prints a
//! single JSON object to stdout. The object is the artifact metadata and
//! must contain a `file_path` entry naming the MIDI file it wrote; relative
//! paths are resolved against the output directory.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{ConversionOutput, ConversionRequest, ConvertError, Converter, METADATA_PATH_KEY};
use crate::job::Metadata;

#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
    config_path: PathBuf,
}

impl CommandConverter {
    pub fn new(program: impl Into<String>, args: Vec<String>, config_path: PathBuf) -> Self {
        Self {
            program: program.into(),
            args,
            config_path,
        }
    }

    /// Build from a whitespace-separated command line such as
    /// `python -m text2midi.cli`.
    pub fn from_command_line(command: &str, config_path: PathBuf) -> Result<Self, ConvertError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(ConvertError::InvalidCommand)?;
        Ok(Self::new(program, parts.collect(), config_path))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

impl Converter for CommandConverter {
    fn convert(&self, request: &ConversionRequest) -> Result<ConversionOutput, ConvertError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg("--config")
            .arg(&self.config_path)
            .arg("--output-dir")
            .arg(&request.output_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(ConvertError::Spawn)?;

        if let Some(mut stdin) = child.stdin.take() {
            // A program that ignores stdin may exit before reading it.
            match stdin.write_all(request.text.as_bytes()) {
                Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e.into()),
                _ => {}
            }
        }

        let output = child.wait_with_output()?;

        if !output.status.success() {
            return Err(ConvertError::ExecutionFailed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_output(&output.stdout, &request.output_dir)
    }
}

/// Parse a converter's stdout into a [`ConversionOutput`].
pub fn parse_output(stdout: &[u8], output_dir: &Path) -> Result<ConversionOutput, ConvertError> {
    let text = String::from_utf8_lossy(stdout);
    let metadata: Metadata =
        serde_json::from_str(text.trim()).map_err(|e| ConvertError::Parse(format!("{e}: {text}")))?;

    let reported = metadata
        .get(METADATA_PATH_KEY)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or(ConvertError::MissingArtifact)?;

    let reported = PathBuf::from(reported);
    let artifact_path = if reported.is_absolute() {
        reported
    } else {
        output_dir.join(reported)
    };

    Ok(ConversionOutput {
        artifact_path,
        metadata,
    })
}
