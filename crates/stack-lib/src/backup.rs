//! Snapshot creation, listing, and restore
//!
//! A snapshot is a timestamped directory under `backups/` holding a full
//! copy of the bind subtree, the config subtree, the descriptor, and a
//! `meta.json` record. Snapshots are never auto-deleted.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::compose::{self, ComposeCli};
use crate::error::{Result, StackError};
use crate::fsops;
use crate::layout::{DeploymentLayout, BINDS_DIR, CONFIG_DIR, DESCRIPTOR_FILE};
use crate::services::SERVICES;

pub const META_FILE: &str = "meta.json";

/// Metadata record written next to every snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub created_at: DateTime<Utc>,
    pub source_root: PathBuf,
    pub compose_version: String,
    pub services: Vec<String>,
}

impl SnapshotMeta {
    fn new(source_root: &Path, compose_version: String) -> Self {
        Self {
            created_at: Utc::now(),
            source_root: source_root.to_path_buf(),
            compose_version,
            services: SERVICES.iter().map(|s| s.name.to_string()).collect(),
        }
    }
}

/// A snapshot directory paired with its parsed metadata.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotEntry {
    pub path: PathBuf,
    pub meta: SnapshotMeta,
}

/// Stop the stack, write a new snapshot, bring the stack back up.
///
/// The stack is stopped first so data files are quiescent while copied.
pub async fn backup(layout: &DeploymentLayout, cli: &ComposeCli) -> Result<PathBuf> {
    let version = compose::compose_version().await.unwrap_or_default();

    cli.down().await?;
    let result = write_snapshot(layout, version);
    // Bring the stack back regardless of whether the copy succeeded.
    cli.up().await?;

    let snapshot = result?;
    info!(snapshot = %snapshot.display(), "backup complete");
    Ok(snapshot)
}

/// Copy live state into a fresh `backups/snapshot-<timestamp>/` directory.
pub fn write_snapshot(layout: &DeploymentLayout, compose_version: String) -> Result<PathBuf> {
    let snapshot = layout
        .backups_dir()
        .join(format!("snapshot-{}", fsops::timestamp()));
    fs::create_dir_all(&snapshot).map_err(|e| StackError::io(&snapshot, e))?;

    fsops::copy_tree(&layout.binds_dir(), &snapshot.join(BINDS_DIR))?;
    if layout.config_dir().is_dir() {
        fsops::copy_tree(&layout.config_dir(), &snapshot.join(CONFIG_DIR))?;
    }
    fs::copy(layout.descriptor(), snapshot.join(DESCRIPTOR_FILE))
        .map_err(|e| StackError::io(layout.descriptor(), e))?;

    let meta = SnapshotMeta::new(layout.root(), compose_version);
    let meta_path = snapshot.join(META_FILE);
    let json = serde_json::to_string_pretty(&meta)?;
    fs::write(&meta_path, json).map_err(|e| StackError::io(&meta_path, e))?;

    Ok(snapshot)
}

/// Validate a restore target and parse its metadata.
pub fn validate_snapshot(path: &Path) -> Result<SnapshotMeta> {
    if !path.is_dir() {
        return Err(StackError::BackupTargetInvalid {
            path: path.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }
    let meta_path = path.join(META_FILE);
    if !meta_path.is_file() {
        return Err(StackError::BackupTargetInvalid {
            path: path.to_path_buf(),
            reason: format!("missing {META_FILE}"),
        });
    }
    let raw = fs::read_to_string(&meta_path).map_err(|e| StackError::io(&meta_path, e))?;
    Ok(serde_json::from_str(&raw)?)
}

/// Stop the stack, replace live state with the snapshot, bring it back up.
///
/// Destructive and irreversible without another backup: live subtrees are
/// replaced wholesale, never merged. Interactive confirmation is the
/// caller's responsibility.
pub async fn restore(layout: &DeploymentLayout, cli: &ComposeCli, snapshot: &Path) -> Result<()> {
    validate_snapshot(snapshot)?;

    cli.down().await?;
    apply_snapshot(layout, snapshot)?;
    cli.up().await?;

    info!(snapshot = %snapshot.display(), "restore complete");
    Ok(())
}

/// Replace live bind/config subtrees and the descriptor with the snapshot's.
pub fn apply_snapshot(layout: &DeploymentLayout, snapshot: &Path) -> Result<()> {
    fsops::replace_tree(&snapshot.join(BINDS_DIR), &layout.binds_dir())?;
    let snap_config = snapshot.join(CONFIG_DIR);
    if snap_config.is_dir() {
        fsops::replace_tree(&snap_config, &layout.config_dir())?;
    }
    let snap_descriptor = snapshot.join(DESCRIPTOR_FILE);
    fs::copy(&snap_descriptor, layout.descriptor())
        .map_err(|e| StackError::io(&snap_descriptor, e))?;
    Ok(())
}

/// All snapshots under `backups/`, newest first.
pub fn list_snapshots(layout: &DeploymentLayout) -> Result<Vec<SnapshotEntry>> {
    let backups = layout.backups_dir();
    if !backups.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(&backups).map_err(|e| StackError::io(&backups, e))? {
        let entry = entry.map_err(|e| StackError::io(&backups, e))?;
        let path = entry.path();
        if let Ok(meta) = validate_snapshot(&path) {
            entries.push(SnapshotEntry { path, meta });
        }
    }
    entries.sort_by(|a, b| b.meta.created_at.cmp(&a.meta.created_at));
    Ok(entries)
}
