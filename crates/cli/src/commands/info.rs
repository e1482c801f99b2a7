//! Static access information command

use anyhow::Result;
use stack_lib::{StackConfig, StackManager, SERVICES};
use tabled::Tabled;

use crate::output::{print_table, OutputFormat};

/// Row for the access info table
#[derive(Tabled, serde::Serialize)]
struct InfoRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "Access")]
    access: String,
}

pub fn info(config: StackConfig, format: OutputFormat) -> Result<()> {
    let manager = StackManager::open(config)?;

    let rows: Vec<InfoRow> = SERVICES
        .iter()
        .map(|s| InfoRow {
            service: s.name.to_string(),
            port: s.port,
            access: s.access.to_string(),
        })
        .collect();
    print_table(&rows, format);
    println!("\nDeployment root: {}", manager.layout().root().display());
    Ok(())
}
