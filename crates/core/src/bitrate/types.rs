//! Types for the bitrate module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Duration bracket a video falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationTier {
    /// Duration could not be determined.
    Unknown,
    /// Up to the short-video threshold.
    Short,
    /// Up to the medium-video threshold.
    Medium,
    /// Longer than the medium-video threshold.
    Long,
}

impl DurationTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

impl fmt::Display for DurationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sizing decision for a single conversion. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Playback length in minutes; zero or negative means unknown.
    pub duration_minutes: f64,
    /// Bitrate handed to the transcoder, in kbps.
    pub selected_bitrate_kbps: u32,
    /// Analytical output size; zero when the duration is unknown.
    pub estimated_size_bytes: u64,
}

impl VideoMetadata {
    /// Whether the duration probe produced a usable value.
    pub fn duration_known(&self) -> bool {
        self.duration_minutes > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_known() {
        let known = VideoMetadata {
            duration_minutes: 12.5,
            selected_bitrate_kbps: 64,
            estimated_size_bytes: 1,
        };
        let unknown = VideoMetadata {
            duration_minutes: 0.0,
            selected_bitrate_kbps: 64,
            estimated_size_bytes: 0,
        };
        assert!(known.duration_known());
        assert!(!unknown.duration_known());
    }

    #[test]
    fn test_tier_serialization() {
        let json = serde_json::to_string(&DurationTier::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
        assert_eq!(DurationTier::Long.to_string(), "long");
    }
}
