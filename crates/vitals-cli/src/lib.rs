//! Vitals CLI - command-line front end for ECG/EEG anomaly detection
//!
//! This CLI reads sample series from JSON files and:
//! - Runs the rule-based anomaly detectors over them
//! - Synthesizes an EEG band series from an ECG series
//! - Shows the effective engine configuration

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;

use commands::{detect, synthesize};
pub use config::CliConfig;
pub use error::{CliError, CliResult};

/// Vitals CLI application
#[derive(Parser)]
#[command(name = "vitals")]
#[command(about = "Vitals Twin - ECG/EEG anomaly detection", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "VITALS_CONFIG")]
    config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Detect anomalies in ECG and/or EEG series
    Detect(detect::DetectArgs),

    /// Derive an EEG band series from an ECG series
    #[command(alias = "synth")]
    Synthesize(synthesize::SynthesizeArgs),

    /// Show configuration
    Config,
}

/// Run using the current process arguments.
pub async fn run() -> CliResult<()> {
    run_with_args(std::env::args_os()).await
}

/// Run using the provided argument iterator.
pub async fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    // Initialize tracing; stdout carries JSON output, so logs go to stderr
    let filter = if cli.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();

    // Load config
    let config = CliConfig::load(cli.config.as_deref())?;

    // Execute command
    match cli.command {
        Commands::Detect(args) => detect::execute(args, config.engine).await,
        Commands::Synthesize(args) => synthesize::execute(args, config.engine).await,
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}
