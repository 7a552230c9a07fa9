//! Rendering of the extraction outcome and exit codes.

use serde::Serialize;

use audiobound_core::{ConverterError, ErrorKind, ExtractedAudio};

/// Exit code for a successful run.
pub const EXIT_OK: u8 = 0;
/// Exit code for operational failures (tools, disk, timeouts, config).
pub const EXIT_FAILURE: u8 = 1;
/// Exit code for failures the uploader can fix (bad or oversized input).
pub const EXIT_USER_ERROR: u8 = 2;

#[derive(Debug, Serialize)]
struct ErrorReport<'a> {
    error: ErrorBody<'a>,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    kind: ErrorKind,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostic: Option<&'a str>,
}

pub fn exit_code(err: &ConverterError) -> u8 {
    if err.kind().is_user_actionable() {
        EXIT_USER_ERROR
    } else {
        EXIT_FAILURE
    }
}

pub fn render_success(audio: &ExtractedAudio, json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(audio)?);
    }

    let minutes = if audio.metadata.duration_known() {
        format!("{:.1} min", audio.metadata.duration_minutes)
    } else {
        "unknown duration".to_string()
    };
    Ok(format!(
        "{} ({} bytes, {} kbps, {}, {} ms)",
        audio.output_path.display(),
        audio.size_bytes,
        audio.metadata.selected_bitrate_kbps,
        minutes,
        audio.elapsed_ms
    ))
}

pub fn render_failure(err: &ConverterError, json: bool) -> anyhow::Result<String> {
    if json {
        let report = ErrorReport {
            error: ErrorBody {
                kind: err.kind(),
                message: err.to_string(),
                diagnostic: err.diagnostic(),
            },
        };
        return Ok(serde_json::to_string_pretty(&report)?);
    }

    Ok(match err.diagnostic() {
        Some(diagnostic) => format!("error [{}]: {}\n{}", err.kind(), err, diagnostic),
        None => format!("error [{}]: {}", err.kind(), err),
    })
}
