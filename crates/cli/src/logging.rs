use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use audiobound_core::{LogFormat, LoggingConfig};

/// Picks the filter: `RUST_LOG` wins, then `--verbose`, then the config.
fn env_filter(config: &LoggingConfig, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new(&config.filter)
        }
    })
}

/// Initialize logging. Logs go to stderr so stdout stays machine-readable.
pub fn init(config: &LoggingConfig, verbose: bool) {
    let registry = tracing_subscriber::registry().with(env_filter(config, verbose));

    match config.format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
