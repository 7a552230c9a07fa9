//! Trait definitions for the converter module.

use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use super::error::ConverterError;
use super::types::{ToolOutput, TranscodeRequest};

/// An external transcoding tool.
///
/// Implementations report non-zero exits through [`ToolOutput`] rather than as
/// errors so the caller can classify the diagnostics. `Err` is reserved for
/// conditions where the tool never produced an exit status: it could not be
/// started, timed out, or was cancelled.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Returns the name of this transcoder implementation.
    fn name(&self) -> &str;

    /// Confirms the tool can be executed at all.
    async fn check_available(&self, cancel: &CancellationToken) -> Result<(), ConverterError>;

    /// Decodes roughly the first second of `input`, discarding the result.
    async fn probe_integrity(
        &self,
        input: &Path,
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, ConverterError>;

    /// Runs the full audio transcode.
    ///
    /// Must kill the underlying process before returning on timeout or
    /// cancellation.
    async fn transcode(
        &self,
        request: &TranscodeRequest,
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, ConverterError>;
}

/// Reads a media file's playback length without transcoding it.
#[async_trait]
pub trait DurationProber: Send + Sync {
    /// Returns the name of this prober implementation.
    fn name(&self) -> &str;

    /// Container duration in seconds.
    async fn probe_duration(
        &self,
        input: &Path,
        cancel: &CancellationToken,
    ) -> Result<f64, ConverterError>;
}
