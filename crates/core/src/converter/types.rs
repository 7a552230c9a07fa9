//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::bitrate::VideoMetadata;

/// Where an extraction currently is.
///
/// `Idle -> Validating -> ProbingDuration -> Converting -> ValidatingOutput`,
/// ending in either `Succeeded` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStage {
    Idle,
    Validating,
    ProbingDuration,
    Converting,
    ValidatingOutput,
    Succeeded,
    Failed,
}

impl ConversionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "input validation",
            Self::ProbingDuration => "duration probe",
            Self::Converting => "conversion",
            Self::ValidatingOutput => "output validation",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Whether the state machine has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an external tool did once it exited on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output (empty when stdout was discarded).
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl ToolOutput {
    /// A zero exit with no output.
    pub fn ok() -> Self {
        Self {
            exit_code: Some(0),
            ..Default::default()
        }
    }

    /// A non-zero exit carrying diagnostics on stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Trimmed stderr, or `None` if the tool said nothing.
    pub fn diagnostic(&self) -> Option<String> {
        let trimmed = self.stderr.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// A single audio transcode.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeRequest {
    /// Source video.
    pub input_path: PathBuf,
    /// Destination audio file; overwritten if present.
    pub output_path: PathBuf,
    /// Audio bitrate in kbps.
    pub bitrate_kbps: u32,
    /// Upper bound on the transcode wall time.
    pub timeout: Duration,
}

/// Result of a successful extraction. The caller owns `output_path`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedAudio {
    /// Generated audio file.
    pub output_path: PathBuf,
    /// Actual size on disk.
    pub size_bytes: u64,
    /// Sizing decision the file was produced with.
    pub metadata: VideoMetadata,
    /// Wall time of the whole pipeline, in milliseconds.
    pub elapsed_ms: u64,
}
