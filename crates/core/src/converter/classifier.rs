//! Maps raw tool diagnostics onto semantic error kinds.
//!
//! Rules are evaluated in order and the first match wins. Tool wording changes
//! between versions, so a miss is expected and falls back to
//! [`ConverterError::ConversionFailed`] carrying the untouched diagnostic.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::path::Path;

use super::error::{ConverterError, CorruptionKind};
use super::types::{ConversionStage, ToolOutput};

/// Semantic meaning of a recognised diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Corrupted(CorruptionKind),
    FileNotFound,
    PermissionDenied,
    DiskExhausted,
}

/// A single (pattern, classification) pair. Patterns are case-insensitive.
#[derive(Debug, Clone)]
pub struct ClassifierRule {
    pattern: Regex,
    classification: Classification,
}

impl ClassifierRule {
    /// Compiles `pattern` case-insensitively.
    pub fn new(pattern: &str, classification: Classification) -> Result<Self, regex_lite::Error> {
        Ok(Self {
            pattern: Regex::new(&format!("(?i){}", pattern))?,
            classification,
        })
    }

    pub fn matches(&self, diagnostic: &str) -> bool {
        self.pattern.is_match(diagnostic)
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }
}

static BUILTIN_RULES: Lazy<Vec<ClassifierRule>> = Lazy::new(|| {
    [
        ("moov atom not found", Classification::Corrupted(CorruptionKind::MissingIndex)),
        (
            "invalid data found when processing input",
            Classification::Corrupted(CorruptionKind::InvalidData),
        ),
        (
            r"could not find codec parameters|unknown format|does not contain any stream",
            Classification::Corrupted(CorruptionKind::InvalidData),
        ),
        ("no such file or directory", Classification::FileNotFound),
        ("permission denied", Classification::PermissionDenied),
        ("no space left on device", Classification::DiskExhausted),
    ]
    .into_iter()
    .map(|(pattern, classification)| {
        ClassifierRule::new(pattern, classification).expect("built-in classifier pattern")
    })
    .collect()
});

/// Ordered rule list with a generic fallback.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    rules: Vec<ClassifierRule>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self {
            rules: BUILTIN_RULES.clone(),
        }
    }
}

impl ErrorClassifier {
    /// Creates a classifier with the built-in rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule evaluated before every existing one.
    pub fn with_rule(mut self, rule: ClassifierRule) -> Self {
        self.rules.insert(0, rule);
        self
    }

    /// Returns the first matching classification, if any.
    pub fn classify(&self, diagnostic: &str) -> Option<Classification> {
        self.rules
            .iter()
            .find(|rule| rule.matches(diagnostic))
            .map(ClassifierRule::classification)
    }

    /// Turns a failed tool run into a typed error.
    pub fn to_error(
        &self,
        output: &ToolOutput,
        input_path: &Path,
        stage: ConversionStage,
    ) -> ConverterError {
        let diagnostic = output.diagnostic().unwrap_or_default();

        match self.classify(&diagnostic) {
            Some(Classification::Corrupted(kind)) => {
                ConverterError::CorruptedInput { kind, diagnostic }
            }
            Some(Classification::FileNotFound) if names_path(&diagnostic, input_path) => {
                ConverterError::FileNotFound {
                    path: input_path.to_path_buf(),
                    stage,
                }
            }
            // Some other path is missing, e.g. the output directory.
            Some(Classification::FileNotFound) => ConverterError::conversion_failed(
                stage,
                "a file the tool needed was not found",
                Some(diagnostic),
            ),
            Some(Classification::PermissionDenied) => {
                ConverterError::PermissionDenied { stage, diagnostic }
            }
            Some(Classification::DiskExhausted) => {
                ConverterError::DiskExhausted { stage, diagnostic }
            }
            None => {
                let reason = match output.exit_code {
                    Some(code) => format!("tool exited with code {}", code),
                    None => "tool terminated by signal".to_string(),
                };
                ConverterError::conversion_failed(stage, reason, output.diagnostic())
            }
        }
    }
}

/// Whether `diagnostic` mentions `path`, either in full or by file name.
fn names_path(diagnostic: &str, path: &Path) -> bool {
    let full = path.to_string_lossy();
    if !full.is_empty() && diagnostic.contains(full.as_ref()) {
        return true;
    }
    path.file_name()
        .map(|name| diagnostic.contains(name.to_string_lossy().as_ref()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::ErrorKind;

    fn classify(text: &str) -> Option<Classification> {
        ErrorClassifier::new().classify(text)
    }

    #[test]
    fn test_missing_index() {
        assert_eq!(
            classify("[mov,mp4,m4a,3gp,3g2,mj2 @ 0x55d] moov atom not found\nin.mp4: Invalid data found when processing input"),
            Some(Classification::Corrupted(CorruptionKind::MissingIndex))
        );
    }

    #[test]
    fn test_invalid_data() {
        assert_eq!(
            classify("in.mp4: Invalid data found when processing input"),
            Some(Classification::Corrupted(CorruptionKind::InvalidData))
        );
        assert_eq!(
            classify("Could not find codec parameters for stream 0"),
            Some(Classification::Corrupted(CorruptionKind::InvalidData))
        );
    }

    #[test]
    fn test_filesystem_conditions() {
        assert_eq!(
            classify("/tmp/in.mp4: No such file or directory"),
            Some(Classification::FileNotFound)
        );
        assert_eq!(
            classify("/out/a.mp3: Permission denied"),
            Some(Classification::PermissionDenied)
        );
        assert_eq!(
            classify("av_interleaved_write_frame(): No space left on device"),
            Some(Classification::DiskExhausted)
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            classify("NO SPACE LEFT ON DEVICE"),
            Some(Classification::DiskExhausted)
        );
    }

    #[test]
    fn test_unmatched_falls_back_to_generic() {
        let classifier = ErrorClassifier::new();
        let output = ToolOutput::failed(1, "Encoder libmp3lame blew up\n");

        assert_eq!(classifier.classify(&output.stderr), None);

        let err = classifier.to_error(&output, Path::new("in.mp4"), ConversionStage::Converting);
        assert_eq!(err.kind(), ErrorKind::ConversionFailed);
        assert_eq!(err.diagnostic(), Some("Encoder libmp3lame blew up"));
        assert!(err.to_string().contains("code 1"));
    }

    #[test]
    fn test_signal_termination_reason() {
        let output = ToolOutput {
            exit_code: None,
            ..Default::default()
        };
        let err =
            ErrorClassifier::new().to_error(&output, Path::new("in.mp4"), ConversionStage::Converting);
        assert!(err.to_string().contains("signal"));
        assert_eq!(err.diagnostic(), None);
    }

    #[test]
    fn test_to_error_corrupted() {
        let output = ToolOutput::failed(1, "moov atom not found");
        let err =
            ErrorClassifier::new().to_error(&output, Path::new("in.mp4"), ConversionStage::Validating);
        assert!(matches!(
            err,
            ConverterError::CorruptedInput {
                kind: CorruptionKind::MissingIndex,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_input_blames_input() {
        let output = ToolOutput::failed(1, "/videos/in.mp4: No such file or directory");
        let err = ErrorClassifier::new().to_error(
            &output,
            Path::new("/videos/in.mp4"),
            ConversionStage::Converting,
        );
        assert!(matches!(
            err,
            ConverterError::FileNotFound {
                stage: ConversionStage::Converting,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_output_dir_does_not_blame_input() {
        let output = ToolOutput::failed(
            1,
            "/gone/in_audio_0a1b2c3d.mp3: No such file or directory",
        );
        let err = ErrorClassifier::new().to_error(
            &output,
            Path::new("/videos/in.mp4"),
            ConversionStage::Converting,
        );
        assert!(matches!(
            err,
            ConverterError::ConversionFailed {
                stage: ConversionStage::Converting,
                ..
            }
        ));
        assert_eq!(
            err.diagnostic(),
            Some("/gone/in_audio_0a1b2c3d.mp3: No such file or directory")
        );
    }

    #[test]
    fn test_custom_rule_takes_precedence() {
        let classifier = ErrorClassifier::new().with_rule(
            ClassifierRule::new(r"quota exceeded", Classification::DiskExhausted).unwrap(),
        );
        assert_eq!(
            classifier.classify("write failed: Quota exceeded"),
            Some(Classification::DiskExhausted)
        );
        // Built-ins still apply afterwards.
        assert_eq!(
            classifier.classify("moov atom not found"),
            Some(Classification::Corrupted(CorruptionKind::MissingIndex))
        );
    }
}
