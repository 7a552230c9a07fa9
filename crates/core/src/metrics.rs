//! Prometheus metrics for the extraction pipeline.
//!
//! This module provides metrics for:
//! - Extraction outcomes and wall time
//! - Selected bitrates and produced file sizes
//! - Duration probe degradations

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Extraction Metrics
// =============================================================================

/// Extractions total by result.
pub static EXTRACTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("audiobound_extractions_total", "Total audio extractions"),
        &["result"], // "success" or an error kind code
    )
    .unwrap()
});

/// Extraction duration in seconds.
pub static EXTRACTION_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "audiobound_extraction_duration_seconds",
            "Wall time of audio extractions",
        )
        .buckets(vec![0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
    )
    .unwrap()
});

// =============================================================================
// Sizing Metrics
// =============================================================================

/// Bitrate chosen per extraction.
pub static SELECTED_BITRATE: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "audiobound_selected_bitrate_kbps",
            "Audio bitrate selected for each extraction",
        )
        .buckets(vec![16.0, 24.0, 32.0, 48.0, 64.0, 96.0, 128.0]),
    )
    .unwrap()
});

/// Size of successfully produced files.
pub static OUTPUT_SIZE: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("audiobound_output_size_bytes", "Size of produced audio files")
            .buckets(prometheus::exponential_buckets(1024.0 * 1024.0, 2.0, 6).unwrap()),
    )
    .unwrap()
});

/// Duration probes that fell back to "unknown".
pub static DURATION_PROBE_FALLBACKS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "audiobound_duration_probe_fallbacks_total",
        "Duration probes that failed and defaulted to an unknown duration",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(EXTRACTIONS_TOTAL.clone()),
        Box::new(EXTRACTION_DURATION.clone()),
        Box::new(SELECTED_BITRATE.clone()),
        Box::new(OUTPUT_SIZE.clone()),
        Box::new(DURATION_PROBE_FALLBACKS.clone()),
    ]
}
