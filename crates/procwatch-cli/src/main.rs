mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use procwatch_core::MonitorConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "procwatch")]
#[command(about = "Watch for a process and track how long it runs", long_about = None)]
struct Cli {
    /// Configuration file (defaults to config.toml in the data directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start watching the configured process
    Run,
    /// Show recorded usage for a day and its month
    Usage {
        /// Day to report (YYYY-MM-DD format, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = MonitorConfig::load(cli.config.as_deref())?;

    let is_run = matches!(cli.command, Commands::Run);
    commands::logging::init_logging(&config.logging, is_run)?;

    match cli.command {
        Commands::Run => commands::run::run_monitor(config).await,
        Commands::Usage { date, json } => {
            commands::usage::show_usage(&config, date.as_deref(), json)
        }
        Commands::Config => commands::config::show_config(&config),
    }
}
