//! Drover CLI - Main Entry Point
//!
//! Operational commands around the acceptance harness: cleaning run
//! artifacts, validating the environment, and rendering the HTML report.

use clap::{Parser, Subcommand};

mod commands;

use commands::{clean, report, validate_env};

/// Drover - operational tooling for the acceptance harness
#[derive(Parser)]
#[command(name = "drover")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove test artifacts and caches
    Clean(clean::CleanArgs),

    /// Validate the .env configuration before a run
    ValidateEnv(validate_env::ValidateEnvArgs),

    /// Render test-results/report.json as a standalone HTML page
    Report(report::ReportArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Clean(args) => clean::execute(args).await?,
        Commands::ValidateEnv(args) => validate_env::execute(args).await?,
        Commands::Report(args) => report::execute(args).await?,
    }

    Ok(())
}
