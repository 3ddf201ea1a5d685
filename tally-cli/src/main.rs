use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "tally", about = "Inspect feedback questions and aggregate their responses")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Extra config file, applied after user and project config
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the template catalogue
    Templates(commands::templates::TemplatesArgs),
    /// Validate question definitions
    Check(commands::check::CheckArgs),
    /// Aggregate submitted responses
    Results(commands::results::ResultsArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = config::ConfigLoader::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Templates(args) => commands::templates::run(args, &config),
        Commands::Check(args) => commands::check::run(args),
        Commands::Results(args) => commands::results::run(args),
        Commands::Config(args) => commands::config::run(args, &config),
    }
}
