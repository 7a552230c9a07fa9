mod cli;
mod logging;
mod metrics;
mod report;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use audiobound_core::{
    load_config, load_config_from_env, validate_config, AudioExtractor, Config,
};

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Fatal error: {:#}", e);
            ExitCode::from(report::EXIT_FAILURE)
        }
    }
}

async fn run(cli: Cli) -> Result<u8> {
    // Load configuration
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => load_config_from_env().context("Failed to load config from environment")?,
    };
    apply_overrides(&mut config, &cli);

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    // Initialize logging
    logging::init(&config.logging, cli.verbose);
    info!(
        ffmpeg = %config.converter.ffmpeg_path.display(),
        max_size_bytes = config.bitrate.max_size_bytes,
        "Configuration loaded successfully"
    );

    let extractor = AudioExtractor::with_ffmpeg(config.converter, config.bitrate);

    let cancel = CancellationToken::new();
    let signal_task = tokio::spawn(cancel_on_signal(cancel.clone()));

    let result = extractor.extract(&cli.input, &cancel).await;
    signal_task.abort();

    let code = match &result {
        Ok(audio) => {
            println!("{}", report::render_success(audio, cli.json)?);
            report::EXIT_OK
        }
        Err(err) => {
            let rendered = report::render_failure(err, cli.json)?;
            if cli.json {
                println!("{}", rendered);
            } else {
                eprintln!("{}", rendered);
            }
            report::exit_code(err)
        }
    };

    if cli.print_metrics {
        eprint!("{}", metrics::encode_metrics()?);
    }

    Ok(code)
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(dir) = &cli.output_dir {
        config.converter.output_dir = Some(dir.clone());
    }
}

/// Cancel the extraction on Ctrl+C or SIGTERM
async fn cancel_on_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal, cancelling extraction");
    cancel.cancel();
}
