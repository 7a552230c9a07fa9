//! Error types for the converter module.

use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::types::ConversionStage;

/// Which container-level defect the corruption probe recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptionKind {
    /// The container index (e.g. an MP4 `moov` atom) is missing or truncated.
    MissingIndex,
    /// The demuxer or decoder rejected the data as invalid or unsupported.
    InvalidData,
}

impl fmt::Display for CorruptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingIndex => f.write_str("missing container index"),
            Self::InvalidData => f.write_str("invalid or unsupported data"),
        }
    }
}

/// The stable, caller-facing classification of every failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    FileNotFound,
    ToolUnavailable,
    CorruptedInput,
    PermissionDenied,
    DiskExhausted,
    ConversionFailed,
    EmptyOutput,
    OutputTooLarge,
    TimeoutOrCancelled,
}

impl ErrorKind {
    /// Snake-case code, stable across releases.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileNotFound => "file_not_found",
            Self::ToolUnavailable => "tool_unavailable",
            Self::CorruptedInput => "corrupted_input",
            Self::PermissionDenied => "permission_denied",
            Self::DiskExhausted => "disk_exhausted",
            Self::ConversionFailed => "conversion_failed",
            Self::EmptyOutput => "empty_output",
            Self::OutputTooLarge => "output_too_large",
            Self::TimeoutOrCancelled => "timeout_or_cancelled",
        }
    }

    /// Whether the person who supplied the file can fix this themselves.
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound | Self::CorruptedInput | Self::EmptyOutput | Self::OutputTooLarge
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while extracting audio.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// Input file does not exist (or vanished mid-pipeline).
    #[error("Input file not found: {path} (during {stage})")]
    FileNotFound {
        path: PathBuf,
        stage: ConversionStage,
    },

    /// An external tool could not be executed.
    #[error("{tool} is not available at {path}: {reason}")]
    ToolUnavailable {
        tool: &'static str,
        path: PathBuf,
        reason: String,
    },

    /// Input is not decodable media.
    #[error("Input file is corrupted ({kind})")]
    CorruptedInput {
        kind: CorruptionKind,
        diagnostic: String,
    },

    /// Input or output location is not accessible.
    #[error("Permission denied during {stage}")]
    PermissionDenied {
        stage: ConversionStage,
        diagnostic: String,
    },

    /// The output filesystem ran out of space.
    #[error("No space left on device during {stage}")]
    DiskExhausted {
        stage: ConversionStage,
        diagnostic: String,
    },

    /// Generic failure; keeps the raw diagnostic for operators.
    #[error("{stage} failed: {reason}")]
    ConversionFailed {
        stage: ConversionStage,
        reason: String,
        diagnostic: Option<String>,
    },

    /// The encoder exited successfully but wrote nothing.
    #[error("Conversion produced an empty output file: {path}")]
    EmptyOutput { path: PathBuf },

    /// Output overshoots the downstream ceiling.
    #[error("Output file is {size_bytes} bytes, above the {limit_bytes} byte limit")]
    OutputTooLarge { size_bytes: u64, limit_bytes: u64 },

    /// Tool invocation exceeded its time budget.
    #[error("{stage} timed out after {timeout_secs} seconds")]
    Timeout {
        stage: ConversionStage,
        timeout_secs: u64,
    },

    /// The caller's cancellation token fired.
    #[error("Conversion cancelled during {stage}")]
    Cancelled { stage: ConversionStage },

    /// Duration probe failed. Degraded by the extractor, never returned by it.
    #[error("Failed to probe duration: {reason}")]
    ProbeFailed { reason: String },
}

impl ConverterError {
    /// Creates a generic conversion failure.
    pub fn conversion_failed(
        stage: ConversionStage,
        reason: impl Into<String>,
        diagnostic: Option<String>,
    ) -> Self {
        Self::ConversionFailed {
            stage,
            reason: reason.into(),
            diagnostic,
        }
    }

    /// Creates a probe failure.
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }

    /// Wraps a filesystem error on `path` into the matching kind.
    pub fn from_io(err: io::Error, path: &Path, stage: ConversionStage) -> Self {
        let diagnostic = format!("{}: {}", path.display(), err);
        match err.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound {
                path: path.to_path_buf(),
                stage,
            },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { stage, diagnostic },
            io::ErrorKind::StorageFull => Self::DiskExhausted { stage, diagnostic },
            _ => Self::ConversionFailed {
                stage,
                reason: "I/O error".to_string(),
                diagnostic: Some(diagnostic),
            },
        }
    }

    /// Maps this error onto the caller-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound { .. } => ErrorKind::FileNotFound,
            Self::ToolUnavailable { .. } => ErrorKind::ToolUnavailable,
            Self::CorruptedInput { .. } => ErrorKind::CorruptedInput,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::DiskExhausted { .. } => ErrorKind::DiskExhausted,
            Self::ConversionFailed { .. } | Self::ProbeFailed { .. } => {
                ErrorKind::ConversionFailed
            }
            Self::EmptyOutput { .. } => ErrorKind::EmptyOutput,
            Self::OutputTooLarge { .. } => ErrorKind::OutputTooLarge,
            Self::Timeout { .. } | Self::Cancelled { .. } => ErrorKind::TimeoutOrCancelled,
        }
    }

    /// Raw tool output attached to this error, if any.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::CorruptedInput { diagnostic, .. }
            | Self::PermissionDenied { diagnostic, .. }
            | Self::DiskExhausted { diagnostic, .. } => Some(diagnostic),
            Self::ConversionFailed { diagnostic, .. } => diagnostic.as_deref(),
            _ => None,
        }
    }

    /// Whether retrying the same request later might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::DiskExhausted { .. })
    }
}
