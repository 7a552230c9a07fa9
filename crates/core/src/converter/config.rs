//! Configuration for the converter module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the FFmpeg-based audio extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Path to ffprobe binary.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// Directory for generated audio files. Defaults to the input's directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Timeout for the transcode in seconds.
    #[serde(default = "default_conversion_timeout")]
    pub conversion_timeout_secs: u64,

    /// Timeout for the duration probe and the version check in seconds.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Timeout for the partial-decode corruption check in seconds.
    #[serde(default = "default_integrity_timeout")]
    pub integrity_check_timeout_secs: u64,

    /// Output sample rate. 16 kHz is plenty for speech recognition.
    #[serde(default = "default_sample_rate")]
    pub sample_rate_hz: u32,

    /// Output channel count.
    #[serde(default = "default_channels")]
    pub channels: u8,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,

    /// Additional output arguments appended before the output path.
    #[serde(default)]
    pub extra_ffmpeg_args: Vec<String>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_conversion_timeout() -> u64 {
    600 // 10 minutes
}

fn default_probe_timeout() -> u64 {
    30
}

fn default_integrity_timeout() -> u64 {
    30
}

fn default_sample_rate() -> u32 {
    16_000
}

fn default_channels() -> u8 {
    1
}

fn default_log_level() -> String {
    "error".to_string()
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            output_dir: None,
            conversion_timeout_secs: default_conversion_timeout(),
            probe_timeout_secs: default_probe_timeout(),
            integrity_check_timeout_secs: default_integrity_timeout(),
            sample_rate_hz: default_sample_rate(),
            channels: default_channels(),
            ffmpeg_log_level: default_log_level(),
            extra_ffmpeg_args: Vec::new(),
        }
    }
}

impl ConverterConfig {
    /// Creates a new config with custom ffmpeg/ffprobe paths.
    pub fn with_paths(ffmpeg_path: PathBuf, ffprobe_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            ..Default::default()
        }
    }

    /// Sets the output directory.
    pub fn with_output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = Some(output_dir);
        self
    }

    /// Sets the conversion timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.conversion_timeout_secs = timeout_secs;
        self
    }

    /// Sets the probe timeout in seconds.
    pub fn with_probe_timeout(mut self, timeout_secs: u64) -> Self {
        self.probe_timeout_secs = timeout_secs;
        self
    }

    pub fn conversion_timeout(&self) -> Duration {
        Duration::from_secs(self.conversion_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn integrity_check_timeout(&self) -> Duration {
        Duration::from_secs(self.integrity_check_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConverterConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(config.output_dir, None);
        assert_eq!(config.conversion_timeout(), Duration::from_secs(600));
        assert_eq!(config.probe_timeout(), Duration::from_secs(30));
        assert_eq!(config.sample_rate_hz, 16_000);
        assert_eq!(config.channels, 1);
    }

    #[test]
    fn test_config_builder() {
        let config = ConverterConfig::with_paths(
            PathBuf::from("/usr/local/bin/ffmpeg"),
            PathBuf::from("/usr/local/bin/ffprobe"),
        )
        .with_output_dir(PathBuf::from("/tmp/audio"))
        .with_timeout(120)
        .with_probe_timeout(5);

        assert_eq!(config.ffmpeg_path, PathBuf::from("/usr/local/bin/ffmpeg"));
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/audio")));
        assert_eq!(config.conversion_timeout_secs, 120);
        assert_eq!(config.probe_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_config_serialization() {
        let config = ConverterConfig::default().with_output_dir(PathBuf::from("/out"));
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ConverterConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
