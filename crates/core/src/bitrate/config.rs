//! Configuration for bitrate selection and output sizing.

use serde::{Deserialize, Serialize};

const MIB: u64 = 1024 * 1024;

/// Quality tiers, duration thresholds and size limits used to pick a bitrate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitrateConfig {
    /// Bitrate for short (or unknown-length) videos, in kbps.
    #[serde(default = "default_high_quality")]
    pub high_quality_kbps: u32,

    /// Upper bound for medium-length videos, in kbps.
    #[serde(default = "default_medium_quality")]
    pub medium_quality_kbps: u32,

    /// Floor applied to every calculated bitrate, in kbps.
    #[serde(default = "default_low_quality")]
    pub low_quality_kbps: u32,

    /// Videos up to this length (minutes) may use the high tier.
    #[serde(default = "default_short_video_minutes")]
    pub short_video_minutes: f64,

    /// Videos up to this length (minutes) are capped at the medium tier.
    #[serde(default = "default_medium_video_minutes")]
    pub medium_video_minutes: f64,

    /// Size the bitrate calculation aims for, below the hard ceiling.
    #[serde(default = "default_target_size")]
    pub target_size_bytes: u64,

    /// Hard ceiling enforced on the produced file.
    #[serde(default = "default_max_size")]
    pub max_size_bytes: u64,
}

fn default_high_quality() -> u32 {
    64
}

fn default_medium_quality() -> u32 {
    32
}

fn default_low_quality() -> u32 {
    24
}

fn default_short_video_minutes() -> f64 {
    60.0
}

fn default_medium_video_minutes() -> f64 {
    120.0
}

fn default_target_size() -> u64 {
    24 * MIB
}

fn default_max_size() -> u64 {
    25 * MIB
}

impl Default for BitrateConfig {
    fn default() -> Self {
        Self {
            high_quality_kbps: default_high_quality(),
            medium_quality_kbps: default_medium_quality(),
            low_quality_kbps: default_low_quality(),
            short_video_minutes: default_short_video_minutes(),
            medium_video_minutes: default_medium_video_minutes(),
            target_size_bytes: default_target_size(),
            max_size_bytes: default_max_size(),
        }
    }
}

impl BitrateConfig {
    /// Sets the three quality tiers (high, medium, low) in kbps.
    pub fn with_tiers(mut self, high: u32, medium: u32, low: u32) -> Self {
        self.high_quality_kbps = high;
        self.medium_quality_kbps = medium;
        self.low_quality_kbps = low;
        self
    }

    /// Sets the short and medium duration thresholds in minutes.
    pub fn with_thresholds(mut self, short_minutes: f64, medium_minutes: f64) -> Self {
        self.short_video_minutes = short_minutes;
        self.medium_video_minutes = medium_minutes;
        self
    }

    /// Sets the target and maximum output sizes in bytes.
    pub fn with_sizes(mut self, target_bytes: u64, max_bytes: u64) -> Self {
        self.target_size_bytes = target_bytes;
        self.max_size_bytes = max_bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BitrateConfig::default();
        assert_eq!(config.high_quality_kbps, 64);
        assert_eq!(config.medium_quality_kbps, 32);
        assert_eq!(config.low_quality_kbps, 24);
        assert_eq!(config.short_video_minutes, 60.0);
        assert_eq!(config.medium_video_minutes, 120.0);
        assert_eq!(config.target_size_bytes, 24 * 1024 * 1024);
        assert_eq!(config.max_size_bytes, 25 * 1024 * 1024);
    }

    #[test]
    fn test_config_builder() {
        let config = BitrateConfig::default()
            .with_tiers(96, 48, 16)
            .with_thresholds(30.0, 90.0)
            .with_sizes(10 * MIB, 12 * MIB);

        assert_eq!(config.high_quality_kbps, 96);
        assert_eq!(config.low_quality_kbps, 16);
        assert_eq!(config.medium_video_minutes, 90.0);
        assert_eq!(config.max_size_bytes, 12 * MIB);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: BitrateConfig = toml::from_str("high_quality_kbps = 80").unwrap();
        assert_eq!(config.high_quality_kbps, 80);
        assert_eq!(config.medium_quality_kbps, 32);
        assert_eq!(config.max_size_bytes, 25 * MIB);
    }
}
