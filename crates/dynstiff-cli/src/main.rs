//! dynstiff CLI - impact-hammer dynamic stiffness and damping analysis.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dynstiff")]
#[command(author, version, about = "Impact-test dynamic stiffness and damping analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate FRF, dynamic stiffness and damping from an impact test
    Analyze(commands::analyze::AnalyzeArgs),

    /// Export the time-frequency waterfall of a response
    Waterfall(commands::waterfall::WaterfallArgs),

    /// Synthesize an impact test with known modes
    Generate(commands::generate::GenerateArgs),

    /// List, show, validate and save analysis profiles
    Profile(commands::profile::ProfileArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so tables on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Waterfall(args) => commands::waterfall::run(args),
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Profile(args) => commands::profile::run(args),
    }
}
