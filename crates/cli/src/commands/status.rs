//! Health status command

use anyhow::Result;
use stack_lib::{StackConfig, StackManager};
use tabled::Tabled;

use crate::output::{color_state, print_table, OutputFormat};

/// Row for the status table
#[derive(Tabled, serde::Serialize)]
struct StatusRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

pub async fn status(config: StackConfig, format: OutputFormat) -> Result<()> {
    let manager = StackManager::open(config)?;
    let report = manager.status().await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            let rows: Vec<StatusRow> = report
                .iter()
                .map(|h| StatusRow {
                    service: h.service.to_string(),
                    port: h.port,
                    state: color_state(h.state),
                    detail: h.detail.clone().unwrap_or_default(),
                })
                .collect();
            print_table(&rows, format);

            let down = report.iter().filter(|h| !h.state.is_up()).count();
            if down > 0 {
                println!("\n{down} of {} services not running", report.len());
            }
        }
    }
    Ok(())
}
