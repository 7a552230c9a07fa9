//! Mock transcoder for testing.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::converter::{
    ConversionStage, ConverterError, ToolOutput, TranscodeRequest, Transcoder,
};

/// What the mock does when asked to transcode.
#[derive(Debug, Clone)]
pub enum TranscodeBehavior {
    /// Exit 0 after writing a file of exactly `size_bytes`.
    Succeed { size_bytes: u64 },
    /// Exit 0 after writing `bitrate * duration_secs` worth of audio, like a
    /// constant-bitrate encoder would.
    Encode { duration_secs: f64 },
    /// Write `partial_bytes`, then exit non-zero with `stderr`.
    Fail {
        partial_bytes: u64,
        exit_code: i32,
        stderr: String,
    },
    /// Write `partial_bytes`, then block until cancelled or the request times out.
    Hang { partial_bytes: u64 },
    /// Exit 0 without creating the output file.
    NoOutput,
}

impl Default for TranscodeBehavior {
    fn default() -> Self {
        Self::Succeed { size_bytes: 1024 }
    }
}

/// Mock implementation of the Transcoder trait.
///
/// Provides controllable behavior for testing:
/// - Simulate a missing tool
/// - Control the corruption probe's result
/// - Simulate success, failure, empty output and hangs during transcode
/// - Track transcode requests for assertions
///
/// Clones share state, so a test can keep a handle after moving one into
/// an extractor.
///
/// # Example
///
/// ```rust,ignore
/// use audiobound_core::testing::{MockTranscoder, TranscodeBehavior};
///
/// let transcoder = MockTranscoder::new();
/// transcoder.set_behavior(TranscodeBehavior::Hang { partial_bytes: 512 }).await;
///
/// // ... run an extraction and cancel it ...
///
/// let requests = transcoder.recorded_requests().await;
/// assert_eq!(requests.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockTranscoder {
    /// `Some(reason)` makes `check_available` fail.
    unavailable: Arc<RwLock<Option<String>>>,
    /// Result returned by the corruption probe.
    integrity_output: Arc<RwLock<ToolOutput>>,
    /// Transcode behavior.
    behavior: Arc<RwLock<TranscodeBehavior>>,
    /// Recorded transcode requests.
    requests: Arc<RwLock<Vec<TranscodeRequest>>>,
    availability_checks: Arc<RwLock<usize>>,
    integrity_probes: Arc<RwLock<usize>>,
}

impl Default for MockTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscoder {
    /// Create a mock that is available, accepts every input and succeeds.
    pub fn new() -> Self {
        Self {
            unavailable: Arc::new(RwLock::new(None)),
            integrity_output: Arc::new(RwLock::new(ToolOutput::ok())),
            behavior: Arc::new(RwLock::new(TranscodeBehavior::default())),
            requests: Arc::new(RwLock::new(Vec::new())),
            availability_checks: Arc::new(RwLock::new(0)),
            integrity_probes: Arc::new(RwLock::new(0)),
        }
    }

    /// Make the availability check fail with `reason`.
    pub async fn set_unavailable(&self, reason: impl Into<String>) {
        *self.unavailable.write().await = Some(reason.into());
    }

    /// Set what the corruption probe reports.
    pub async fn set_integrity_output(&self, output: ToolOutput) {
        *self.integrity_output.write().await = output;
    }

    /// Set the transcode behavior.
    pub async fn set_behavior(&self, behavior: TranscodeBehavior) {
        *self.behavior.write().await = behavior;
    }

    /// Get all recorded transcode requests.
    pub async fn recorded_requests(&self) -> Vec<TranscodeRequest> {
        self.requests.read().await.clone()
    }

    /// Get the number of transcodes started.
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    pub async fn availability_checks(&self) -> usize {
        *self.availability_checks.read().await
    }

    pub async fn integrity_probes(&self) -> usize {
        *self.integrity_probes.read().await
    }

    /// Create `path` with a length of `size_bytes` without writing the data.
    async fn write_output(path: &Path, size_bytes: u64) -> Result<(), ConverterError> {
        let file = tokio::fs::File::create(path)
            .await
            .map_err(|e| ConverterError::from_io(e, path, ConversionStage::Converting))?;
        file.set_len(size_bytes)
            .await
            .map_err(|e| ConverterError::from_io(e, path, ConversionStage::Converting))
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn check_available(&self, cancel: &CancellationToken) -> Result<(), ConverterError> {
        *self.availability_checks.write().await += 1;

        if cancel.is_cancelled() {
            return Err(ConverterError::Cancelled {
                stage: ConversionStage::Validating,
            });
        }

        match self.unavailable.read().await.clone() {
            Some(reason) => Err(ConverterError::ToolUnavailable {
                tool: "ffmpeg",
                path: "mock-ffmpeg".into(),
                reason,
            }),
            None => Ok(()),
        }
    }

    async fn probe_integrity(
        &self,
        _input: &Path,
        _cancel: &CancellationToken,
    ) -> Result<ToolOutput, ConverterError> {
        *self.integrity_probes.write().await += 1;
        Ok(self.integrity_output.read().await.clone())
    }

    async fn transcode(
        &self,
        request: &TranscodeRequest,
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, ConverterError> {
        self.requests.write().await.push(request.clone());
        let behavior = self.behavior.read().await.clone();

        match behavior {
            TranscodeBehavior::Succeed { size_bytes } => {
                Self::write_output(&request.output_path, size_bytes).await?;
                Ok(ToolOutput::ok())
            }
            TranscodeBehavior::Encode { duration_secs } => {
                let size_bytes =
                    (f64::from(request.bitrate_kbps) * 1024.0 * duration_secs / 8.0) as u64;
                Self::write_output(&request.output_path, size_bytes).await?;
                Ok(ToolOutput::ok())
            }
            TranscodeBehavior::Fail {
                partial_bytes,
                exit_code,
                stderr,
            } => {
                if partial_bytes > 0 {
                    Self::write_output(&request.output_path, partial_bytes).await?;
                }
                Ok(ToolOutput::failed(exit_code, stderr))
            }
            TranscodeBehavior::Hang { partial_bytes } => {
                Self::write_output(&request.output_path, partial_bytes).await?;
                tokio::select! {
                    _ = cancel.cancelled() => Err(ConverterError::Cancelled {
                        stage: ConversionStage::Converting,
                    }),
                    _ = tokio::time::sleep(request.timeout) => Err(ConverterError::Timeout {
                        stage: ConversionStage::Converting,
                        timeout_secs: request.timeout.as_secs(),
                    }),
                }
            }
            TranscodeBehavior::NoOutput => Ok(ToolOutput::ok()),
        }
    }
}
