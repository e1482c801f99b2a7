//! Resource usage command

use anyhow::Result;
use stack_lib::{StackConfig, StackManager};
use tabled::Tabled;

use crate::output::{format_bytes, print_table, OutputFormat};

/// Row for the disk usage table
#[derive(Tabled, serde::Serialize)]
struct UsageRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Bind Directory")]
    bind_dir: String,
    #[tabled(rename = "Disk Usage")]
    usage: String,
}

pub async fn resources(config: StackConfig, format: OutputFormat) -> Result<()> {
    let manager = StackManager::open(config)?;

    // Container CPU/memory/IO comes straight from the engine; disk usage of
    // the bind directories is ours to compute.
    let usage = manager.resources().await?;

    println!();
    let rows: Vec<UsageRow> = usage
        .iter()
        .map(|u| UsageRow {
            service: u.service.to_string(),
            bind_dir: u.bind_dir.to_string(),
            usage: format_bytes(u.bytes),
        })
        .collect();
    print_table(&rows, format);
    Ok(())
}
