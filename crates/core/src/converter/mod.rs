//! Converter module for extracting audio from video files.
//!
//! This module provides the [`AudioExtractor`] pipeline and the adapters it
//! drives: a [`Transcoder`] that validates and converts media, and a
//! [`DurationProber`] that reads container duration. The production
//! implementations shell out to FFmpeg and FFprobe.
//!
//! # Features
//!
//! - Input validation (existence, tool availability, partial-decode corruption probe)
//! - Best-effort duration detection that degrades to "unknown"
//! - Duration-adaptive bitrate via [`crate::bitrate::BitrateStrategy`]
//! - Timeouts and cooperative cancellation for every external process
//! - Unique output names and guaranteed cleanup of partial files
//! - Diagnostic classification into a closed set of error kinds
//!
//! # Example
//!
//! ```ignore
//! use audiobound_core::bitrate::BitrateConfig;
//! use audiobound_core::converter::{AudioExtractor, ConverterConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let extractor = AudioExtractor::with_ffmpeg(ConverterConfig::default(), BitrateConfig::default());
//! let audio = extractor
//!     .extract(Path::new("/videos/lecture.mp4"), &CancellationToken::new())
//!     .await?;
//! println!("{} ({} bytes)", audio.output_path.display(), audio.size_bytes);
//! ```

mod classifier;
mod config;
mod error;
mod extractor;
mod ffmpeg;
mod ffprobe;
mod output;
mod process;
mod traits;
mod types;
mod validator;

pub use classifier::{Classification, ClassifierRule, ErrorClassifier};
pub use config::ConverterConfig;
pub use error::{ConverterError, CorruptionKind, ErrorKind};
pub use extractor::AudioExtractor;
pub use ffmpeg::{FfmpegTranscoder, AUDIO_CODEC, OUTPUT_FORMAT};
pub use ffprobe::FfprobeDurationProber;
pub use output::{output_path_for, PartialOutput, OUTPUT_EXTENSION, OUTPUT_SUFFIX};
pub use process::ToolCommand;
pub use traits::{DurationProber, Transcoder};
pub use types::{ConversionStage, ExtractedAudio, ToolOutput, TranscodeRequest};
pub use validator::{check_input_exists, ensure_integrity, OutputValidator};
