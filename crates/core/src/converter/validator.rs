//! Input and output checks around the transcode.

use std::path::Path;

use super::classifier::ErrorClassifier;
use super::error::ConverterError;
use super::output::remove_if_exists;
use super::types::{ConversionStage, ToolOutput};

/// Confirms `path` is an existing regular file and returns its size.
pub async fn check_input_exists(path: &Path) -> Result<u64, ConverterError> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| ConverterError::from_io(e, path, ConversionStage::Validating))?;

    if !meta.is_file() {
        return Err(ConverterError::conversion_failed(
            ConversionStage::Validating,
            "input is not a regular file",
            Some(path.display().to_string()),
        ));
    }

    Ok(meta.len())
}

/// Interprets the corruption probe's result.
///
/// Known corruption signatures become [`ConverterError::CorruptedInput`]; any
/// other non-zero exit is a generic validation failure carrying the raw text.
pub fn ensure_integrity(
    output: &ToolOutput,
    input: &Path,
    classifier: &ErrorClassifier,
) -> Result<(), ConverterError> {
    if output.success() {
        Ok(())
    } else {
        Err(classifier.to_error(output, input, ConversionStage::Validating))
    }
}

/// Checks a freshly produced file against the downstream ceiling.
#[derive(Debug, Clone, Copy)]
pub struct OutputValidator {
    max_size_bytes: u64,
}

impl OutputValidator {
    pub fn new(max_size_bytes: u64) -> Self {
        Self { max_size_bytes }
    }

    /// Returns the file size if it is non-empty and within the limit.
    ///
    /// Rejected files are deleted before the error is returned.
    pub async fn validate(&self, path: &Path) -> Result<u64, ConverterError> {
        let size_bytes = match tokio::fs::metadata(path).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConverterError::EmptyOutput {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => {
                remove_if_exists(path).await;
                return Err(ConverterError::from_io(
                    e,
                    path,
                    ConversionStage::ValidatingOutput,
                ));
            }
        };

        if size_bytes == 0 {
            remove_if_exists(path).await;
            return Err(ConverterError::EmptyOutput {
                path: path.to_path_buf(),
            });
        }

        if size_bytes > self.max_size_bytes {
            remove_if_exists(path).await;
            return Err(ConverterError::OutputTooLarge {
                size_bytes,
                limit_bytes: self.max_size_bytes,
            });
        }

        Ok(size_bytes)
    }
}
