pub mod bitrate;
pub mod config;
pub mod converter;
pub mod metrics;
pub mod testing;

pub use bitrate::{BitrateConfig, BitrateStrategy, DurationTier, VideoMetadata};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, LogFormat, LoggingConfig,
};
pub use converter::{
    AudioExtractor, ConversionStage, ConverterConfig, ConverterError, ErrorKind, ExtractedAudio,
    FfmpegTranscoder, FfprobeDurationProber,
};
