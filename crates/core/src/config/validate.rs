use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Bitrate tiers are non-zero and ordered low <= medium <= high
/// - Duration thresholds are positive, finite and ordered short < medium
/// - Sizes are non-zero and target <= max
/// - Timeouts, sample rate and channel count are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let bitrate = &config.bitrate;

    // Bitrate validation
    if bitrate.low_quality_kbps == 0
        || bitrate.medium_quality_kbps == 0
        || bitrate.high_quality_kbps == 0
    {
        return Err(invalid("bitrate tiers cannot be 0"));
    }
    if bitrate.low_quality_kbps > bitrate.medium_quality_kbps
        || bitrate.medium_quality_kbps > bitrate.high_quality_kbps
    {
        return Err(invalid(format!(
            "bitrate tiers must satisfy low <= medium <= high (got {} / {} / {})",
            bitrate.low_quality_kbps, bitrate.medium_quality_kbps, bitrate.high_quality_kbps
        )));
    }

    // Threshold validation
    for (name, minutes) in [
        ("bitrate.short_video_minutes", bitrate.short_video_minutes),
        ("bitrate.medium_video_minutes", bitrate.medium_video_minutes),
    ] {
        if !minutes.is_finite() || minutes <= 0.0 {
            return Err(invalid(format!("{} must be positive", name)));
        }
    }
    if bitrate.short_video_minutes >= bitrate.medium_video_minutes {
        return Err(invalid(
            "bitrate.short_video_minutes must be less than bitrate.medium_video_minutes",
        ));
    }

    // Size validation
    if bitrate.target_size_bytes == 0 || bitrate.max_size_bytes == 0 {
        return Err(invalid("bitrate size limits cannot be 0"));
    }
    if bitrate.target_size_bytes > bitrate.max_size_bytes {
        return Err(invalid(
            "bitrate.target_size_bytes cannot exceed bitrate.max_size_bytes",
        ));
    }

    // Converter validation
    let converter = &config.converter;
    if converter.conversion_timeout_secs == 0
        || converter.probe_timeout_secs == 0
        || converter.integrity_check_timeout_secs == 0
    {
        return Err(invalid("converter timeouts cannot be 0"));
    }
    if converter.sample_rate_hz == 0 {
        return Err(invalid("converter.sample_rate_hz cannot be 0"));
    }
    if converter.channels == 0 {
        return Err(invalid("converter.channels cannot be 0"));
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}
