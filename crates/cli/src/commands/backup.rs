//! backup / restore / list-backups

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Result;
use stack_lib::{backup, StackConfig, StackManager};
use tabled::Tabled;

use crate::output::{
    format_timestamp, print_info, print_success, print_warning, print_table, OutputFormat,
};

/// Row for the snapshot listing table
#[derive(Tabled, serde::Serialize)]
struct SnapshotRow {
    #[tabled(rename = "Snapshot")]
    name: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Compose")]
    compose_version: String,
    #[tabled(rename = "Services")]
    services: usize,
}

pub async fn backup(config: StackConfig) -> Result<()> {
    let manager = StackManager::open(config)?;
    print_info("Stopping stack for a consistent snapshot...");
    let snapshot = manager.backup().await?;
    print_success(&format!("Snapshot written to {}", snapshot.display()));
    Ok(())
}

pub async fn restore(config: StackConfig, path: &Path, yes: bool) -> Result<()> {
    let manager = StackManager::open(config)?;
    backup::validate_snapshot(path)?;

    if !yes && !confirm(path)? {
        print_info("Restore cancelled, deployment unmodified");
        return Ok(());
    }

    manager.restore(path).await?;
    print_success("Snapshot restored, stack restarted");
    Ok(())
}

pub async fn list_backups(config: StackConfig, format: OutputFormat) -> Result<()> {
    let manager = StackManager::open(config)?;
    let entries = manager.list_backups()?;

    let rows: Vec<SnapshotRow> = entries
        .iter()
        .map(|e| SnapshotRow {
            name: e
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            created: format_timestamp(&e.meta.created_at),
            compose_version: e.meta.compose_version.clone(),
            services: e.meta.services.len(),
        })
        .collect();
    print_table(&rows, format);
    Ok(())
}

/// Destructive-restore confirmation gate. Anything but an explicit yes
/// leaves the deployment untouched.
fn confirm(path: &Path) -> Result<bool> {
    print_warning(&format!(
        "This will REPLACE live data with the snapshot at {}",
        path.display()
    ));
    print!("Type 'yes' to continue: ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("yes\n"));
        assert!(is_affirmative("  Y  "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("no\n"));
        assert!(!is_affirmative("yess"));
    }
}
