//! Monitoring stack installer
//!
//! One-shot, root-privileged. Provisions the deployment root, stages the
//! compose descriptor and configuration, fixes bind-directory ownership per
//! service, rewrites descriptor paths, and triggers the first start.

use anyhow::Result;
use colored::Colorize;
use stack_lib::install::Installer;
use stack_lib::{StackConfig, SERVICES};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let config = StackConfig::load()?;
    info!(root = %config.root.display(), source = %config.source.display(), "starting install");

    let installer = Installer::new(config);
    if let Err(err) = installer.run().await {
        error!(%err, "INSTALL FAILED");
        eprintln!("{} {}", "✗".red().bold(), err);
        std::process::exit(1);
    }

    print_completion_report(installer.layout().root());
    Ok(())
}

/// Access summary printed once the stack is up.
fn print_completion_report(root: &std::path::Path) {
    println!();
    println!("{}", "Monitoring stack installed".green().bold());
    println!("{}", "=".repeat(60));
    for service in SERVICES {
        println!("  {:<14} {}", service.name.cyan(), service.access);
    }
    println!();
    println!("Deployment root: {}", root.display());
    println!(
        "Manage the stack with: {}",
        "monstack <start|stop|status|backup|...>".bold()
    );
}
