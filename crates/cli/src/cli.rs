use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "audiobound")]
#[command(author, version, about = "Extract size-bounded speech audio from a video file")]
pub struct Cli {
    /// Video file to convert
    #[arg(required = true)]
    pub input: PathBuf,

    /// Path to config file (defaults plus AUDIOBOUND_* variables when omitted)
    #[arg(short, long, env = "AUDIOBOUND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for the generated audio file (defaults to the input's directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Print the result as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Print Prometheus metrics on stderr after the run
    #[arg(long)]
    pub print_metrics: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
