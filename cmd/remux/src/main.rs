//! Remux CLI - converts browser WebM/Opus recordings into Ogg/Opus.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod output;

use commands::{ConvertCommand, InspectCommand};

/// Remux CLI - WebM/Opus to Ogg/Opus without re-encoding.
///
/// Opus packets are copied from the WebM blocks into Ogg pages. Input that
/// already is Ogg is passed through unchanged.
#[derive(Parser)]
#[command(name = "remux")]
#[command(about = "WebM/Opus to Ogg/Opus remuxer")]
#[command(version)]
pub struct Cli {
    /// Remux options file (YAML or JSON)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a WebM recording into an Ogg file
    Convert(ConvertCommand),
    /// List the Ogg pages of a file, remuxing WebM input first
    Inspect(InspectCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout may carry audio.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Convert(cmd) => cmd.run(&cli),
        Commands::Inspect(cmd) => cmd.run(&cli),
    }
}
