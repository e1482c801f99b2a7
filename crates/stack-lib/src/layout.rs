//! Deployment root layout
//!
//! All persistent state lives under one directory. The layout is fixed:
//!
//! ```text
//! <root>/
//!   docker-compose.yml     service descriptor
//!   config/                per-service configuration subtree
//!   monitoring-binds/      one persistent-data directory per service
//!   backups/               timestamped snapshots
//!   monstack.log           operational log of manager actions
//! ```

use std::path::{Path, PathBuf};

use crate::error::{Result, StackError};
use crate::services::SERVICES;

pub const DESCRIPTOR_FILE: &str = "docker-compose.yml";
pub const CONFIG_DIR: &str = "config";
pub const BINDS_DIR: &str = "monitoring-binds";
pub const BACKUPS_DIR: &str = "backups";
pub const OPLOG_FILE: &str = "monstack.log";

/// Resolved paths inside one deployment root.
#[derive(Debug, Clone)]
pub struct DeploymentLayout {
    root: PathBuf,
}

impl DeploymentLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn descriptor(&self) -> PathBuf {
        self.root.join(DESCRIPTOR_FILE)
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join(CONFIG_DIR)
    }

    pub fn binds_dir(&self) -> PathBuf {
        self.root.join(BINDS_DIR)
    }

    pub fn bind_dir(&self, name: &str) -> PathBuf {
        self.binds_dir().join(name)
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.root.join(BACKUPS_DIR)
    }

    pub fn oplog(&self) -> PathBuf {
        self.root.join(OPLOG_FILE)
    }

    /// All bind directories, from the service table.
    pub fn all_bind_dirs(&self) -> Vec<PathBuf> {
        SERVICES.iter().map(|s| self.bind_dir(s.bind_dir)).collect()
    }

    /// Fail with `NotInstalled` unless the root and descriptor both exist.
    ///
    /// Precondition for every manager verb that touches the deployment.
    pub fn ensure_installed(&self) -> Result<()> {
        if !self.root.is_dir() || !self.descriptor().is_file() {
            return Err(StackError::NotInstalled(self.root.clone()));
        }
        Ok(())
    }
}
