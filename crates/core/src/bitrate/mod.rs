//! Bitrate selection for size-bounded audio output.
//!
//! The encoder's exact output size is unknown before it runs, so the bitrate is
//! derived analytically from the video duration: aim for a safety-margin size
//! below the hard ceiling, then clamp into duration-based quality tiers.
//!
//! # Example
//!
//! ```
//! use audiobound_core::bitrate::{BitrateConfig, BitrateStrategy};
//!
//! let strategy = BitrateStrategy::new(BitrateConfig::default());
//! let plan = strategy.plan(30.0);
//! assert_eq!(plan.selected_bitrate_kbps, 64);
//! ```

mod config;
mod strategy;
mod types;

pub use config::BitrateConfig;
pub use strategy::BitrateStrategy;
pub use types::{DurationTier, VideoMetadata};
