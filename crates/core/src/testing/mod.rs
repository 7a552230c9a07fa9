//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external tool traits,
//! allowing the extraction pipeline to be tested without FFmpeg installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use audiobound_core::testing::{MockDurationProber, MockTranscoder, TranscodeBehavior};
//!
//! let transcoder = MockTranscoder::new();
//! let prober = MockDurationProber::with_duration_minutes(150.0);
//!
//! // Configure mock responses
//! transcoder.set_behavior(TranscodeBehavior::Encode { duration_secs: 9000.0 }).await;
//!
//! // Use in AudioExtractor::new(...)
//! ```

mod mock_prober;
mod mock_transcoder;

pub use mock_prober::{MockDurationProber, ProbeBehavior};
pub use mock_transcoder::{MockTranscoder, TranscodeBehavior};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    use crate::converter::ToolOutput;

    /// Write a small placeholder video file into `dir`.
    pub fn video_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"\x00\x00\x00\x18ftypmp42placeholder")
            .expect("failed to write fixture video");
        path
    }

    /// Files in `dir` produced by the extractor.
    pub fn audio_outputs(dir: &Path) -> Vec<PathBuf> {
        let mut outputs: Vec<PathBuf> = std::fs::read_dir(dir)
            .expect("failed to read fixture dir")
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "mp3"))
            .collect();
        outputs.sort();
        outputs
    }

    /// Corruption-probe result for an MP4 whose index atom is missing.
    pub fn missing_index_output() -> ToolOutput {
        ToolOutput::failed(
            1,
            "[mov,mp4,m4a,3gp,3g2,mj2 @ 0x55d5c] moov atom not found\n\
             upload.mp4: Invalid data found when processing input",
        )
    }

    /// Corruption-probe result for unreadable data.
    pub fn invalid_data_output() -> ToolOutput {
        ToolOutput::failed(1, "upload.mp4: Invalid data found when processing input")
    }

    /// FFmpeg failing mid-write on a full disk.
    pub fn disk_full_stderr() -> String {
        "[mp3 @ 0x7f] Error writing trailer: No space left on device".to_string()
    }
}
