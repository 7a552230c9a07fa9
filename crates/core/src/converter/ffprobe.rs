//! FFprobe-based duration prober.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::config::ConverterConfig;
use super::error::ConverterError;
use super::process::ToolCommand;
use super::traits::DurationProber;
use super::types::ConversionStage;

/// Reads container duration with `ffprobe -show_entries format=duration`.
#[derive(Debug, Clone)]
pub struct FfprobeDurationProber {
    ffprobe_path: PathBuf,
    timeout: Duration,
}

impl FfprobeDurationProber {
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            ffprobe_path: config.ffprobe_path.clone(),
            timeout: config.probe_timeout(),
        }
    }

    fn build_args(input: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "json".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
        ]
    }

    /// Parses ffprobe JSON output into seconds.
    fn parse_duration_output(output: &str) -> Result<f64, ConverterError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: Option<ProbeFormat>,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            duration: Option<String>,
        }

        let probe: ProbeOutput = serde_json::from_str(output).map_err(|e| {
            ConverterError::probe_failed(format!("Failed to parse ffprobe output: {}", e))
        })?;

        let raw = probe
            .format
            .and_then(|f| f.duration)
            .ok_or_else(|| ConverterError::probe_failed("ffprobe reported no duration"))?;

        let seconds = raw.trim().parse::<f64>().map_err(|_| {
            ConverterError::probe_failed(format!("Unparsable duration: {:?}", raw))
        })?;

        if !seconds.is_finite() || seconds < 0.0 {
            return Err(ConverterError::probe_failed(format!(
                "Implausible duration: {}",
                seconds
            )));
        }

        Ok(seconds)
    }
}

#[async_trait]
impl DurationProber for FfprobeDurationProber {
    fn name(&self) -> &str {
        "ffprobe"
    }

    async fn probe_duration(
        &self,
        input: &Path,
        cancel: &CancellationToken,
    ) -> Result<f64, ConverterError> {
        let output = ToolCommand::new("ffprobe", &self.ffprobe_path, ConversionStage::ProbingDuration)
            .args(Self::build_args(input))
            .timeout(self.timeout)
            .capture_stdout()
            .run(cancel)
            .await?;

        if !output.success() {
            return Err(ConverterError::probe_failed(format!(
                "ffprobe failed: {}",
                output.diagnostic().unwrap_or_default()
            )));
        }

        Self::parse_duration_output(&output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_output() {
        let json = r#"{
            "format": {
                "duration": "1800.480000"
            }
        }"#;

        let seconds = FfprobeDurationProber::parse_duration_output(json).unwrap();
        assert!((seconds - 1800.48).abs() < 0.001);
    }

    #[test]
    fn test_parse_not_available_duration() {
        let json = r#"{ "format": { "duration": "N/A" } }"#;
        let err = FfprobeDurationProber::parse_duration_output(json).unwrap_err();
        assert!(matches!(err, ConverterError::ProbeFailed { .. }));
    }

    #[test]
    fn test_parse_missing_format() {
        let err = FfprobeDurationProber::parse_duration_output("{}").unwrap_err();
        assert!(err.to_string().contains("no duration"));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(FfprobeDurationProber::parse_duration_output("not json").is_err());
        assert!(FfprobeDurationProber::parse_duration_output(
            r#"{ "format": { "duration": "-3.0" } }"#
        )
        .is_err());
    }

    #[test]
    fn test_build_args() {
        let args = FfprobeDurationProber::build_args(Path::new("/videos/a.mp4"));
        assert_eq!(args[args.len() - 1], "/videos/a.mp4");
        assert_eq!(args[args.len() - 2], "-i");
        assert!(args.contains(&"format=duration".to_string()));
    }

    #[test]
    fn test_dash_prefixed_input_is_not_an_option() {
        let args = FfprobeDurationProber::build_args(Path::new("-clip.mp4"));
        let pos = args.iter().position(|a| a == "-clip.mp4").unwrap();
        assert_eq!(args[pos - 1], "-i");
    }

    #[tokio::test]
    async fn test_missing_ffprobe_is_an_error() {
        let config = ConverterConfig::with_paths(
            PathBuf::from("ffmpeg"),
            PathBuf::from("/nonexistent/ffprobe"),
        );
        let prober = FfprobeDurationProber::new(&config);

        let result = prober
            .probe_duration(Path::new("/videos/a.mp4"), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(ConverterError::ToolUnavailable { .. })));
    }
}
