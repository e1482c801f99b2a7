//! start / stop / restart / pull / update / logs / clean

use anyhow::Result;
use stack_lib::{StackConfig, StackManager};

use crate::output::{print_info, print_success};

pub async fn start(config: StackConfig) -> Result<()> {
    let manager = StackManager::open(config)?;
    let listing = manager.start().await?;
    println!("{listing}");
    print_success("Stack started");
    Ok(())
}

pub async fn stop(config: StackConfig) -> Result<()> {
    let manager = StackManager::open(config)?;
    manager.stop().await?;
    print_success("Stack stopped");
    Ok(())
}

pub async fn restart(config: StackConfig) -> Result<()> {
    let manager = StackManager::open(config)?;
    let listing = manager.restart().await?;
    println!("{listing}");
    print_success("Stack restarted");
    Ok(())
}

pub async fn pull(config: StackConfig) -> Result<()> {
    let manager = StackManager::open(config)?;
    manager.pull().await?;
    print_success("Images updated (restart to apply)");
    Ok(())
}

pub async fn update(config: StackConfig) -> Result<()> {
    let manager = StackManager::open(config)?;
    let listing = manager.update().await?;
    println!("{listing}");
    print_success("Stack updated and restarted");
    Ok(())
}

pub async fn logs(config: StackConfig, service: Option<&str>, follow: bool) -> Result<()> {
    let manager = StackManager::open(config)?;
    manager.logs(service, follow).await?;
    Ok(())
}

pub async fn clean(config: StackConfig) -> Result<()> {
    let manager = StackManager::open(config)?;
    let truncated = manager.clean().await?;
    print_success("Pruned unused engine resources");
    if truncated {
        print_info("Operational log was oversized and has been truncated");
    }
    Ok(())
}
