//! Monitoring stack lifecycle manager CLI
//!
//! A command-line tool for operating an installed monitoring stack:
//! start/stop, health status, logs, image updates, backup and restore,
//! and resource reporting.

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use stack_lib::StackConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Monitoring stack lifecycle manager
#[derive(Parser)]
#[command(name = "monstack")]
#[command(author, version, about = "Lifecycle manager for the monitoring stack", long_about = None)]
pub struct Cli {
    /// Deployment root (can also be set via MONSTACK_ROOT env var)
    #[arg(long, global = true, env = "MONSTACK_ROOT", default_value = "/opt/monstack")]
    pub root: PathBuf,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bring all services up and report status
    Start,

    /// Bring all services down
    Stop,

    /// Stop, pause briefly, then start
    Restart,

    /// Show container states and probe each service's health endpoint
    Status,

    /// Stream or tail logs for one or all services
    Logs {
        /// Service name (all services if omitted)
        service: Option<String>,

        /// Follow log output
        #[arg(long, short)]
        follow: bool,
    },

    /// Fetch latest images without restarting
    Pull,

    /// Pull latest images, then recreate the stack
    Update,

    /// Snapshot bind data, configuration, and the descriptor
    Backup,

    /// Replace live data with a snapshot (destructive, asks for confirmation)
    Restore {
        /// Path to the snapshot directory
        path: PathBuf,

        /// Skip the interactive confirmation
        #[arg(long)]
        yes: bool,
    },

    /// List available snapshots
    ListBackups,

    /// Prune unused engine resources and trim the operational log
    Clean,

    /// Report per-container usage and per-bind-directory disk usage
    Resources,

    /// Print service access URLs and credentials
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with(fmt::layer().with_target(false))
        .init();

    let mut config = StackConfig::load()?;
    config.root = cli.root.clone();

    let result = match cli.command {
        Commands::Start => commands::lifecycle::start(config).await,
        Commands::Stop => commands::lifecycle::stop(config).await,
        Commands::Restart => commands::lifecycle::restart(config).await,
        Commands::Status => commands::status::status(config, cli.format).await,
        Commands::Logs { service, follow } => {
            commands::lifecycle::logs(config, service.as_deref(), follow).await
        }
        Commands::Pull => commands::lifecycle::pull(config).await,
        Commands::Update => commands::lifecycle::update(config).await,
        Commands::Backup => commands::backup::backup(config).await,
        Commands::Restore { path, yes } => commands::backup::restore(config, &path, yes).await,
        Commands::ListBackups => commands::backup::list_backups(config, cli.format).await,
        Commands::Clean => commands::lifecycle::clean(config).await,
        Commands::Resources => commands::resources::resources(config, cli.format).await,
        Commands::Info => commands::info::info(config, cli.format),
    };

    if let Err(err) = result {
        output::print_error(&format!("{err:#}"));
        std::process::exit(1);
    }
    Ok(())
}
