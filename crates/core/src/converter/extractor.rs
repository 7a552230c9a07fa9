//! Video-to-audio extraction pipeline.

use std::path::Path;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::bitrate::{BitrateConfig, BitrateStrategy, VideoMetadata};
use crate::metrics;

use super::classifier::ErrorClassifier;
use super::config::ConverterConfig;
use super::error::ConverterError;
use super::ffmpeg::FfmpegTranscoder;
use super::ffprobe::FfprobeDurationProber;
use super::output::{output_path_for, PartialOutput};
use super::traits::{DurationProber, Transcoder};
use super::types::{ConversionStage, ExtractedAudio, TranscodeRequest};
use super::validator::{check_input_exists, ensure_integrity, OutputValidator};

/// Follows one extraction through its stages.
struct StageTracker {
    current: ConversionStage,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            current: ConversionStage::Idle,
        }
    }

    fn advance(&mut self, next: ConversionStage) {
        debug_assert!(
            !self.current.is_terminal(),
            "extraction already finished in {}",
            self.current
        );
        debug!(from = %self.current, to = %next, "Extraction stage transition");
        self.current = next;
    }

    fn current(&self) -> ConversionStage {
        self.current
    }
}

/// Turns a video file into a size-bounded audio file.
///
/// Stages run strictly in order and the first failure ends the run:
/// input validation, best-effort duration probe, bitrate selection,
/// transcode, output validation. No stage is retried.
pub struct AudioExtractor<T: Transcoder, P: DurationProber> {
    config: ConverterConfig,
    strategy: BitrateStrategy,
    output_validator: OutputValidator,
    classifier: ErrorClassifier,
    transcoder: T,
    prober: P,
}

impl AudioExtractor<FfmpegTranscoder, FfprobeDurationProber> {
    /// Wires the real ffmpeg/ffprobe adapters.
    pub fn with_ffmpeg(config: ConverterConfig, bitrate: BitrateConfig) -> Self {
        let transcoder = FfmpegTranscoder::new(config.clone());
        let prober = FfprobeDurationProber::new(&config);
        Self::new(config, bitrate, transcoder, prober)
    }
}

impl<T: Transcoder, P: DurationProber> AudioExtractor<T, P> {
    /// Creates a new extractor.
    pub fn new(config: ConverterConfig, bitrate: BitrateConfig, transcoder: T, prober: P) -> Self {
        Self {
            output_validator: OutputValidator::new(bitrate.max_size_bytes),
            strategy: BitrateStrategy::new(bitrate),
            classifier: ErrorClassifier::default(),
            config,
            transcoder,
            prober,
        }
    }

    /// Replaces the diagnostic classifier.
    pub fn with_classifier(mut self, classifier: ErrorClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Extracts audio from `input`.
    ///
    /// On success the caller owns the returned file. On any failure no output
    /// file is left behind. Cancelling `cancel` kills whichever tool is running.
    pub async fn extract(
        &self,
        input: &Path,
        cancel: &CancellationToken,
    ) -> Result<ExtractedAudio, ConverterError> {
        let start = Instant::now();
        let mut tracker = StageTracker::new();

        let result = self.run_stages(input, cancel, &mut tracker, start).await;
        metrics::EXTRACTION_DURATION.observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(audio) => {
                tracker.advance(ConversionStage::Succeeded);
                metrics::EXTRACTIONS_TOTAL.with_label_values(&["success"]).inc();
                metrics::OUTPUT_SIZE.observe(audio.size_bytes as f64);
                info!(
                    input = %input.display(),
                    output = %audio.output_path.display(),
                    size_bytes = audio.size_bytes,
                    bitrate_kbps = audio.metadata.selected_bitrate_kbps,
                    elapsed_ms = audio.elapsed_ms,
                    "Audio extraction succeeded"
                );
            }
            Err(e) => {
                let failed_in = tracker.current();
                tracker.advance(ConversionStage::Failed);
                metrics::EXTRACTIONS_TOTAL
                    .with_label_values(&[e.kind().as_str()])
                    .inc();
                error!(
                    input = %input.display(),
                    stage = %failed_in,
                    kind = %e.kind(),
                    diagnostic = e.diagnostic().unwrap_or(""),
                    "Audio extraction failed: {}",
                    e
                );
            }
        }

        result
    }

    async fn run_stages(
        &self,
        input: &Path,
        cancel: &CancellationToken,
        tracker: &mut StageTracker,
        start: Instant,
    ) -> Result<ExtractedAudio, ConverterError> {
        tracker.advance(ConversionStage::Validating);
        ensure_not_cancelled(cancel, ConversionStage::Validating)?;
        self.validate_input(input, cancel).await?;

        tracker.advance(ConversionStage::ProbingDuration);
        ensure_not_cancelled(cancel, ConversionStage::ProbingDuration)?;
        let duration_minutes = self.detect_duration(input, cancel).await?;
        let metadata = self.plan(duration_minutes);

        tracker.advance(ConversionStage::Converting);
        ensure_not_cancelled(cancel, ConversionStage::Converting)?;
        let output = self.convert(input, &metadata, cancel).await?;

        tracker.advance(ConversionStage::ValidatingOutput);
        let size_bytes = self.output_validator.validate(output.path()).await?;

        Ok(ExtractedAudio {
            output_path: output.keep(),
            size_bytes,
            metadata,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn validate_input(
        &self,
        input: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), ConverterError> {
        info!(input = %input.display(), "Validating input");

        let size_bytes = check_input_exists(input).await?;
        self.transcoder.check_available(cancel).await?;

        let probe = self.transcoder.probe_integrity(input, cancel).await?;
        ensure_integrity(&probe, input, &self.classifier)?;

        debug!(input = %input.display(), size_bytes, "Input passed validation");
        Ok(())
    }

    /// Duration in minutes, or 0.0 when it cannot be determined.
    ///
    /// Only cancellation is propagated; every other probe failure degrades.
    async fn detect_duration(
        &self,
        input: &Path,
        cancel: &CancellationToken,
    ) -> Result<f64, ConverterError> {
        match self.prober.probe_duration(input, cancel).await {
            Ok(seconds) if seconds.is_finite() && seconds > 0.0 => {
                let duration_minutes = seconds / 60.0;
                info!(duration_minutes, prober = self.prober.name(), "Detected video duration");
                Ok(duration_minutes)
            }
            Ok(seconds) => {
                metrics::DURATION_PROBE_FALLBACKS.inc();
                warn!(seconds, "Duration probe returned no usable duration, assuming unknown");
                Ok(0.0)
            }
            Err(e @ ConverterError::Cancelled { .. }) => Err(e),
            Err(e) => {
                metrics::DURATION_PROBE_FALLBACKS.inc();
                warn!(
                    error = %e,
                    prober = self.prober.name(),
                    "Duration probe failed, defaulting to highest quality bitrate"
                );
                Ok(0.0)
            }
        }
    }

    fn plan(&self, duration_minutes: f64) -> VideoMetadata {
        let metadata = self.strategy.plan(duration_minutes);
        metrics::SELECTED_BITRATE.observe(f64::from(metadata.selected_bitrate_kbps));
        info!(
            duration_minutes,
            tier = %self.strategy.tier(duration_minutes),
            bitrate_kbps = metadata.selected_bitrate_kbps,
            estimated_size_bytes = metadata.estimated_size_bytes,
            "Selected audio bitrate"
        );
        metadata
    }

    async fn convert(
        &self,
        input: &Path,
        metadata: &VideoMetadata,
        cancel: &CancellationToken,
    ) -> Result<PartialOutput, ConverterError> {
        let output_path = output_path_for(input, self.config.output_dir.as_deref());
        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ConverterError::from_io(e, parent, ConversionStage::Converting))?;
        }

        let output = PartialOutput::new(output_path);
        let request = TranscodeRequest {
            input_path: input.to_path_buf(),
            output_path: output.path().to_path_buf(),
            bitrate_kbps: metadata.selected_bitrate_kbps,
            timeout: self.config.conversion_timeout(),
        };

        info!(
            transcoder = self.transcoder.name(),
            output = %request.output_path.display(),
            bitrate_kbps = request.bitrate_kbps,
            timeout_secs = request.timeout.as_secs(),
            "Starting transcode"
        );

        // Early returns drop `output`, which removes the partial file.
        let result = self.transcoder.transcode(&request, cancel).await?;
        if !result.success() {
            output.discard().await;
            return Err(self
                .classifier
                .to_error(&result, input, ConversionStage::Converting));
        }

        Ok(output)
    }
}

fn ensure_not_cancelled(
    cancel: &CancellationToken,
    stage: ConversionStage,
) -> Result<(), ConverterError> {
    if cancel.is_cancelled() {
        Err(ConverterError::Cancelled { stage })
    } else {
        Ok(())
    }
}
