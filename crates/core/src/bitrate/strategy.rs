//! Duration-driven bitrate selection.

use super::config::BitrateConfig;
use super::types::{DurationTier, VideoMetadata};

/// Picks an audio bitrate that keeps the output near the target size.
///
/// Pure and stateless apart from its configuration, so a single instance can be
/// shared across any number of concurrent conversions.
#[derive(Debug, Clone, Default)]
pub struct BitrateStrategy {
    config: BitrateConfig,
}

impl BitrateStrategy {
    /// Creates a strategy with the given configuration.
    pub fn new(config: BitrateConfig) -> Self {
        Self { config }
    }

    /// Creates a strategy with default tiers and sizes.
    pub fn with_defaults() -> Self {
        Self::new(BitrateConfig::default())
    }

    pub fn config(&self) -> &BitrateConfig {
        &self.config
    }

    /// Classifies a duration into its tier.
    pub fn tier(&self, duration_minutes: f64) -> DurationTier {
        if is_unknown(duration_minutes) {
            DurationTier::Unknown
        } else if duration_minutes <= self.config.short_video_minutes {
            DurationTier::Short
        } else if duration_minutes <= self.config.medium_video_minutes {
            DurationTier::Medium
        } else {
            DurationTier::Long
        }
    }

    /// Returns the bitrate (kbps) for a video of the given length.
    ///
    /// Unknown durations (zero, negative, NaN) get the high tier. Otherwise the
    /// bitrate that would hit the target size exactly is truncated to whole kbps,
    /// capped by the tier ceiling and floored at the low tier. Short videos are
    /// capped at the high tier, everything longer at the medium tier, which keeps
    /// the result non-increasing in duration.
    pub fn calculate_bitrate(&self, duration_minutes: f64) -> u32 {
        let cap = match self.tier(duration_minutes) {
            DurationTier::Unknown => return self.config.high_quality_kbps,
            DurationTier::Short => self.config.high_quality_kbps,
            DurationTier::Medium | DurationTier::Long => self.config.medium_quality_kbps,
        };

        let calculated = self.target_bitrate(duration_minutes).floor();
        if calculated >= f64::from(cap) {
            cap
        } else {
            (calculated as u32).max(self.config.low_quality_kbps)
        }
    }

    /// Estimates the output size in bytes; zero when the duration is unknown.
    pub fn estimate_file_size(&self, duration_minutes: f64, bitrate_kbps: u32) -> u64 {
        if is_unknown(duration_minutes) {
            return 0;
        }
        let seconds = duration_minutes * 60.0;
        (f64::from(bitrate_kbps) * 1024.0 * seconds / 8.0) as u64
    }

    /// Runs both calculations and packages the result.
    pub fn plan(&self, duration_minutes: f64) -> VideoMetadata {
        let selected_bitrate_kbps = self.calculate_bitrate(duration_minutes);
        VideoMetadata {
            duration_minutes,
            selected_bitrate_kbps,
            estimated_size_bytes: self.estimate_file_size(duration_minutes, selected_bitrate_kbps),
        }
    }

    /// Kbps that would produce exactly `target_size_bytes`.
    fn target_bitrate(&self, duration_minutes: f64) -> f64 {
        let seconds = duration_minutes * 60.0;
        self.config.target_size_bytes as f64 * 8.0 / (seconds * 1024.0)
    }
}

/// Zero, negative and NaN durations mean the length could not be determined.
fn is_unknown(duration_minutes: f64) -> bool {
    duration_minutes.is_nan() || duration_minutes <= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    fn durations() -> impl Iterator<Item = f64> {
        (1..=2400).map(|i| i as f64 * 0.25)
    }

    #[test]
    fn test_short_video_gets_high_quality() {
        let strategy = BitrateStrategy::with_defaults();
        let plan = strategy.plan(30.0);

        assert_eq!(plan.selected_bitrate_kbps, 64);
        assert_eq!(plan.estimated_size_bytes, 14_745_600);
        assert_eq!(strategy.tier(30.0), DurationTier::Short);
    }

    #[test]
    fn test_long_video_clamped_to_low_quality() {
        let strategy = BitrateStrategy::with_defaults();
        let plan = strategy.plan(150.0);

        assert_eq!(plan.selected_bitrate_kbps, 24);
        assert_eq!(plan.estimated_size_bytes, 27_648_000);
        // Above the hard ceiling: the output validator has to catch this one.
        assert!(plan.estimated_size_bytes > strategy.config().max_size_bytes);
    }

    #[test]
    fn test_unknown_duration_defaults_to_high_quality() {
        let strategy = BitrateStrategy::with_defaults();
        let plan = strategy.plan(0.0);

        assert_eq!(plan.selected_bitrate_kbps, 64);
        assert_eq!(plan.estimated_size_bytes, 0);
        assert_eq!(strategy.calculate_bitrate(-5.0), 64);
        assert_eq!(strategy.calculate_bitrate(f64::NAN), 64);
        assert_eq!(strategy.tier(f64::NAN), DurationTier::Unknown);
    }

    #[test]
    fn test_calculated_bitrate_between_tiers() {
        let strategy = BitrateStrategy::with_defaults();
        // 24 MiB over 60 minutes is ~54.6 kbps: below high, above low.
        assert_eq!(strategy.calculate_bitrate(60.0), 54);
        // 24 MiB over 120 minutes is ~27.3 kbps: below medium, above low.
        assert_eq!(strategy.calculate_bitrate(120.0), 27);
        // Just past the short threshold the medium cap applies.
        assert_eq!(strategy.calculate_bitrate(61.0), 32);
    }

    #[test]
    fn test_bitrate_is_monotonically_non_increasing() {
        let strategy = BitrateStrategy::with_defaults();
        let mut previous = u32::MAX;
        for d in durations() {
            let bitrate = strategy.calculate_bitrate(d);
            assert!(
                bitrate <= previous,
                "bitrate rose from {} to {} at {} minutes",
                previous,
                bitrate,
                d
            );
            previous = bitrate;
        }
    }

    #[test]
    fn test_monotonic_with_generous_target_size() {
        // A huge target would let a naive long tier jump back above the medium cap.
        let strategy = BitrateStrategy::new(BitrateConfig::default().with_sizes(500 * MIB, 510 * MIB));
        let mut previous = u32::MAX;
        for d in durations() {
            let bitrate = strategy.calculate_bitrate(d);
            assert!(bitrate <= previous, "bitrate rose at {} minutes", d);
            previous = bitrate;
        }
        assert_eq!(strategy.calculate_bitrate(121.0), 32);
    }

    #[test]
    fn test_bitrate_stays_within_tier_bounds() {
        let strategy = BitrateStrategy::with_defaults();
        let extremes = [
            0.0,
            -1.0,
            f64::NAN,
            f64::INFINITY,
            f64::MIN_POSITIVE,
            1e-9,
            1e9,
        ];
        for d in durations().chain(extremes) {
            let bitrate = strategy.calculate_bitrate(d);
            assert!((24..=64).contains(&bitrate), "{} kbps at {} minutes", bitrate, d);
        }
    }

    #[test]
    fn test_is_unknown() {
        assert!(is_unknown(0.0));
        assert!(is_unknown(-0.0));
        assert!(is_unknown(-1.0));
        assert!(is_unknown(f64::NAN));
        assert!(!is_unknown(f64::MIN_POSITIVE));
        assert!(!is_unknown(90.0));
    }

    #[test]
    fn test_estimate_zero_for_unknown_duration() {
        let strategy = BitrateStrategy::with_defaults();
        assert_eq!(strategy.estimate_file_size(0.0, 64), 0);
        assert_eq!(strategy.estimate_file_size(-10.0, 64), 0);
        assert_eq!(strategy.estimate_file_size(f64::NAN, 64), 0);
    }

    #[test]
    fn test_estimate_within_target_up_to_medium_threshold() {
        let strategy = BitrateStrategy::with_defaults();
        let target = strategy.config().target_size_bytes;
        for d in durations().take_while(|d| *d <= 120.0) {
            let plan = strategy.plan(d);
            assert!(
                plan.estimated_size_bytes <= target,
                "{} bytes at {} minutes",
                plan.estimated_size_bytes,
                d
            );
        }
    }

    #[test]
    fn test_very_long_video_may_exceed_target() {
        let strategy = BitrateStrategy::with_defaults();
        let plan = strategy.plan(300.0);
        assert_eq!(plan.selected_bitrate_kbps, 24);
        assert!(plan.estimated_size_bytes > strategy.config().target_size_bytes);
    }

    #[test]
    fn test_custom_tiers() {
        let config = BitrateConfig::default()
            .with_tiers(128, 48, 16)
            .with_thresholds(10.0, 20.0);
        let strategy = BitrateStrategy::new(config);

        assert_eq!(strategy.calculate_bitrate(5.0), 128);
        assert_eq!(strategy.calculate_bitrate(15.0), 48);
        assert_eq!(strategy.calculate_bitrate(1000.0), 16);
        assert_eq!(strategy.tier(15.0), DurationTier::Medium);
        assert_eq!(strategy.tier(25.0), DurationTier::Long);
    }

    #[test]
    fn test_pure_under_concurrency() {
        let strategy = BitrateStrategy::with_defaults();
        let expected: Vec<_> = durations().map(|d| strategy.plan(d)).collect();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let actual: Vec<_> = durations().map(|d| strategy.plan(d)).collect();
                    assert_eq!(actual, expected);
                });
            }
        });
    }
}
