//! Lifecycle operations over an installed deployment
//!
//! One verb per invocation, synchronous, no persistent process. Every verb
//! that touches the deployment requires it to exist first and appends a
//! record to the operational log.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::backup::{self, SnapshotEntry};
use crate::compose::{self, ComposeCli};
use crate::config::StackConfig;
use crate::error::Result;
use crate::fsops;
use crate::health::{self, ServiceHealth};
use crate::layout::DeploymentLayout;
use crate::oplog;
use crate::services::SERVICES;

/// Disk usage of one bind directory, for the `resources` verb.
#[derive(Debug, Clone, Serialize)]
pub struct BindUsage {
    pub service: &'static str,
    pub bind_dir: &'static str,
    pub bytes: u64,
}

/// Dispatches lifecycle verbs against one deployment root.
#[derive(Debug)]
pub struct StackManager {
    config: StackConfig,
    layout: DeploymentLayout,
    cli: ComposeCli,
}

impl StackManager {
    /// Bind to a deployment root. Fails with `NotInstalled` when the root or
    /// descriptor is missing; nothing on disk is touched in that case.
    pub fn open(config: StackConfig) -> Result<Self> {
        let layout = DeploymentLayout::new(&config.root);
        layout.ensure_installed()?;
        Ok(Self {
            cli: ComposeCli::new(layout.descriptor()),
            layout,
            config,
        })
    }

    pub fn layout(&self) -> &DeploymentLayout {
        &self.layout
    }

    pub fn compose(&self) -> &ComposeCli {
        &self.cli
    }

    fn log_action(&self, action: &str) {
        // The operational log is advisory; a failed append never fails the verb.
        if let Err(err) = oplog::append(&self.layout.oplog(), action) {
            tracing::warn!(%err, "could not append to operational log");
        }
    }

    /// Bring all services up, wait out the grace period, return the listing.
    pub async fn start(&self) -> Result<String> {
        self.log_action("start");
        self.cli.up().await?;
        info!(
            grace_secs = self.config.startup_grace_secs,
            "stack starting"
        );
        tokio::time::sleep(Duration::from_secs(self.config.startup_grace_secs)).await;
        self.cli.ps().await
    }

    /// Bring all services down.
    pub async fn stop(&self) -> Result<()> {
        self.log_action("stop");
        self.cli.down().await
    }

    /// Down, brief pause, up.
    pub async fn restart(&self) -> Result<String> {
        self.log_action("restart");
        self.cli.down().await?;
        tokio::time::sleep(Duration::from_secs(2)).await;
        self.start().await
    }

    /// Fetch latest images without restarting anything.
    pub async fn pull(&self) -> Result<()> {
        self.log_action("pull");
        self.cli.pull().await
    }

    /// Pull, then recreate the stack on the new images.
    pub async fn update(&self) -> Result<String> {
        self.log_action("update");
        self.cli.pull().await?;
        self.cli.down().await?;
        self.start().await
    }

    /// Probe every service and classify it.
    pub async fn status(&self) -> Result<Vec<ServiceHealth>> {
        self.log_action("status");
        let timeout = Duration::from_millis(self.config.probe_timeout_ms);
        health::check_stack(&self.cli, timeout).await
    }

    /// Stream or tail logs for one service or all of them.
    pub async fn logs(&self, service: Option<&str>, follow: bool) -> Result<()> {
        self.log_action("logs");
        self.cli.logs(service, follow).await
    }

    /// Snapshot bind data, configuration, and the descriptor.
    pub async fn backup(&self) -> Result<PathBuf> {
        self.log_action("backup");
        backup::backup(&self.layout, &self.cli).await
    }

    /// Replace live state with a snapshot. Confirmation is the caller's job.
    pub async fn restore(&self, snapshot: &Path) -> Result<()> {
        self.log_action("restore");
        backup::restore(&self.layout, &self.cli, snapshot).await
    }

    /// All snapshots under `backups/`, newest first.
    pub fn list_backups(&self) -> Result<Vec<SnapshotEntry>> {
        self.log_action("list-backups");
        backup::list_snapshots(&self.layout)
    }

    /// Prune unused engine resources and truncate an oversized operational log.
    pub async fn clean(&self) -> Result<bool> {
        self.log_action("clean");
        compose::prune().await?;
        oplog::truncate_if_oversized(&self.layout.oplog(), self.config.log_max_bytes)
    }

    /// Per-container stats passthrough plus per-bind-directory disk usage.
    pub async fn resources(&self) -> Result<Vec<BindUsage>> {
        self.log_action("resources");
        compose::stats().await?;
        Ok(self.bind_usage())
    }

    /// Disk usage of every bind directory.
    pub fn bind_usage(&self) -> Vec<BindUsage> {
        SERVICES
            .iter()
            .map(|s| BindUsage {
                service: s.name,
                bind_dir: s.bind_dir,
                bytes: fsops::dir_size(&self.layout.bind_dir(s.bind_dir)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StackError;
    use std::fs;
    use tempfile::tempdir;

    fn config_for(root: &std::path::Path) -> StackConfig {
        StackConfig {
            root: root.to_path_buf(),
            ..StackConfig::default()
        }
    }

    #[test]
    fn test_open_fails_fast_when_not_installed() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("deploy");

        let err = StackManager::open(config_for(&missing)).unwrap_err();
        assert!(matches!(err, StackError::NotInstalled(_)));
        // Fail-fast must not create anything on disk.
        assert!(!missing.exists());
    }

    #[test]
    fn test_open_succeeds_on_installed_root() {
        let dir = tempdir().unwrap();
        let layout = DeploymentLayout::new(dir.path());
        fs::write(layout.descriptor(), "services: {}\n").unwrap();

        let manager = StackManager::open(config_for(dir.path())).unwrap();
        assert_eq!(manager.layout().root(), dir.path());
    }

    fn installed_manager(root: &Path) -> StackManager {
        let layout = DeploymentLayout::new(root);
        fs::write(layout.descriptor(), "services: {}\n").unwrap();
        StackManager::open(config_for(root)).unwrap()
    }

    fn oplog_actions(manager: &StackManager) -> Vec<String> {
        let contents = fs::read_to_string(manager.layout().oplog()).unwrap_or_default();
        contents
            .lines()
            .filter_map(|l| l.split_whitespace().last())
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_backup_appends_oplog_record() {
        let dir = tempdir().unwrap();
        let manager = installed_manager(dir.path());
        crate::install::provision_binds(manager.layout()).unwrap();

        // The record is appended before the engine is touched, so it lands
        // whether or not a docker daemon is available here.
        let _ = manager.backup().await;

        assert!(oplog_actions(&manager).contains(&"backup".to_string()));
    }

    #[tokio::test]
    async fn test_restore_appends_oplog_record() {
        let dir = tempdir().unwrap();
        let manager = installed_manager(dir.path());

        let err = manager
            .restore(&dir.path().join("no-such-snapshot"))
            .await
            .unwrap_err();

        assert!(matches!(err, StackError::BackupTargetInvalid { .. }));
        assert!(oplog_actions(&manager).contains(&"restore".to_string()));
    }

    #[test]
    fn test_list_backups_appends_oplog_record() {
        let dir = tempdir().unwrap();
        let manager = installed_manager(dir.path());

        let entries = manager.list_backups().unwrap();

        assert!(entries.is_empty());
        assert!(oplog_actions(&manager).contains(&"list-backups".to_string()));
    }

    #[test]
    fn test_bind_usage_covers_every_service() {
        let dir = tempdir().unwrap();
        let layout = DeploymentLayout::new(dir.path());
        fs::write(layout.descriptor(), "services: {}\n").unwrap();
        fs::create_dir_all(layout.bind_dir("grafana-data")).unwrap();
        fs::write(layout.bind_dir("grafana-data").join("db"), vec![0u8; 42]).unwrap();

        let manager = StackManager::open(config_for(dir.path())).unwrap();
        let usage = manager.bind_usage();

        assert_eq!(usage.len(), SERVICES.len());
        let grafana = usage.iter().find(|u| u.service == "grafana").unwrap();
        assert_eq!(grafana.bytes, 42);
        // Absent bind directories report zero rather than erroring.
        let influx = usage.iter().find(|u| u.service == "influxdb").unwrap();
        assert_eq!(influx.bytes, 0);
    }
}
