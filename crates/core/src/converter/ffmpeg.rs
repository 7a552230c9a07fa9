//! FFmpeg-based transcoder implementation.

use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use super::config::ConverterConfig;
use super::error::ConverterError;
use super::process::ToolCommand;
use super::traits::Transcoder;
use super::types::{ConversionStage, ToolOutput, TranscodeRequest};

/// Encoder used for every output file.
pub const AUDIO_CODEC: &str = "libmp3lame";

/// Muxer used for every output file.
pub const OUTPUT_FORMAT: &str = "mp3";

/// How much of the input the corruption probe decodes, in seconds.
const INTEGRITY_PROBE_SECS: &str = "1";

/// FFmpeg-based transcoder implementation.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    config: ConverterConfig,
}

impl FfmpegTranscoder {
    /// Creates a new FFmpeg transcoder with the given configuration.
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Creates a transcoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ConverterConfig::default())
    }

    fn command(&self, stage: ConversionStage) -> ToolCommand {
        ToolCommand::new("ffmpeg", &self.config.ffmpeg_path, stage)
    }

    /// Arguments for the partial decode: first second only, output discarded.
    fn build_integrity_args(&self, input_path: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
            "-t".to_string(),
            INTEGRITY_PROBE_SECS.to_string(),
            "-f".to_string(),
            "null".to_string(),
            "-".to_string(),
        ]
    }

    /// Arguments for the audio-only transcode.
    fn build_transcode_args(&self, request: &TranscodeRequest) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-y".to_string(), // Overwrite output
            "-i".to_string(),
            request.input_path.to_string_lossy().to_string(),
        ];

        // Audio only
        args.push("-vn".to_string());

        // Codec, bitrate and speech-oriented resampling
        args.extend([
            "-c:a".to_string(),
            AUDIO_CODEC.to_string(),
            "-b:a".to_string(),
            format!("{}k", request.bitrate_kbps),
            "-ar".to_string(),
            self.config.sample_rate_hz.to_string(),
            "-ac".to_string(),
            self.config.channels.to_string(),
        ]);

        // Tolerate odd timestamps and large interleaving gaps
        args.extend([
            "-avoid_negative_ts".to_string(),
            "make_zero".to_string(),
            "-max_muxing_queue_size".to_string(),
            "1024".to_string(),
        ]);

        // Log level
        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ]);

        // Extra args
        args.extend(self.config.extra_ffmpeg_args.iter().cloned());

        // Output
        args.extend(["-f".to_string(), OUTPUT_FORMAT.to_string()]);
        args.push(request.output_path.to_string_lossy().to_string());

        args
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn check_available(&self, cancel: &CancellationToken) -> Result<(), ConverterError> {
        let result = self
            .command(ConversionStage::Validating)
            .arg("-version")
            .timeout(self.config.probe_timeout())
            .run(cancel)
            .await;

        let unavailable = |reason: String| ConverterError::ToolUnavailable {
            tool: "ffmpeg",
            path: self.config.ffmpeg_path.clone(),
            reason,
        };

        match result {
            Ok(output) if output.success() => Ok(()),
            Ok(output) => Err(unavailable(
                output
                    .diagnostic()
                    .unwrap_or_else(|| format!("-version exited with {:?}", output.exit_code)),
            )),
            Err(err @ ConverterError::Timeout { .. }) => Err(unavailable(err.to_string())),
            Err(err) => Err(err),
        }
    }

    async fn probe_integrity(
        &self,
        input: &Path,
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, ConverterError> {
        self.command(ConversionStage::Validating)
            .args(self.build_integrity_args(input))
            .timeout(self.config.integrity_check_timeout())
            .run(cancel)
            .await
    }

    async fn transcode(
        &self,
        request: &TranscodeRequest,
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, ConverterError> {
        self.command(ConversionStage::Converting)
            .args(self.build_transcode_args(request))
            .timeout(request.timeout)
            .run(cancel)
            .await
    }
}
