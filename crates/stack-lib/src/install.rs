//! One-shot installer flow
//!
//! Steps run strictly in order and abort on the first failure. The only
//! safety net is non-destructive: a pre-existing deployment is renamed aside
//! with a timestamp suffix, never deleted or overwritten.

use std::fs;
use std::time::Duration;

use nix::unistd::Uid;
use tracing::{info, warn};

use crate::compose::{self, ComposeCli};
use crate::config::StackConfig;
use crate::descriptor;
use crate::error::{Result, StackError};
use crate::fsops;
use crate::layout::{DeploymentLayout, BINDS_DIR, CONFIG_DIR, DESCRIPTOR_FILE};
use crate::services::{BindOwner, SERVICES};

/// Sequences the install steps against one target root.
pub struct Installer {
    config: StackConfig,
    layout: DeploymentLayout,
}

impl Installer {
    pub fn new(config: StackConfig) -> Self {
        let layout = DeploymentLayout::new(&config.root);
        Self { config, layout }
    }

    pub fn layout(&self) -> &DeploymentLayout {
        &self.layout
    }

    /// Run the full install: preflight, target prep, staging, bind
    /// provisioning, path rewrite, permission fix-up, first start.
    pub async fn run(&self) -> Result<()> {
        require_root()?;
        compose::preflight().await?;

        self.prepare_target()?;
        self.stage_files()?;
        provision_binds(&self.layout)?;
        descriptor::rewrite_paths(&self.layout)?;
        fix_permissions(&self.layout)?;
        self.activate().await?;

        Ok(())
    }

    /// Archive any prior deployment, then create a fresh root.
    fn prepare_target(&self) -> Result<()> {
        let root = self.layout.root();
        if root.exists() {
            let archived = fsops::rename_aside(root)?;
            warn!(
                archived = %archived.display(),
                "existing deployment renamed aside"
            );
        }
        fs::create_dir_all(root).map_err(|e| StackError::io(root, e))?;
        info!(root = %root.display(), "deployment root created");
        Ok(())
    }

    /// Copy descriptor, config subtree, and any pre-existing persistent data
    /// from the source tree into the target.
    fn stage_files(&self) -> Result<()> {
        let source = &self.config.source;

        let src_descriptor = source.join(DESCRIPTOR_FILE);
        if !src_descriptor.is_file() {
            return Err(StackError::DescriptorNotFound(src_descriptor));
        }
        fs::copy(&src_descriptor, self.layout.descriptor())
            .map_err(|e| StackError::io(&src_descriptor, e))?;

        let src_config = source.join(CONFIG_DIR);
        if src_config.is_dir() {
            fsops::copy_tree(&src_config, &self.layout.config_dir())?;
        }

        // Seed data shipped with the source tree (dashboards, retention
        // schemas) travels with the install.
        let src_binds = source.join(BINDS_DIR);
        if src_binds.is_dir() {
            fsops::copy_tree(&src_binds, &self.layout.binds_dir())?;
        }

        info!(source = %source.display(), "staged files into deployment root");
        Ok(())
    }

    /// Pull images, bring the stack up, give the containers a grace period,
    /// then show what is running.
    async fn activate(&self) -> Result<()> {
        let cli = ComposeCli::new(self.layout.descriptor());
        cli.pull().await?;
        cli.up().await?;

        info!(
            grace_secs = self.config.startup_grace_secs,
            "waiting for services to settle"
        );
        tokio::time::sleep(Duration::from_secs(self.config.startup_grace_secs)).await;

        let listing = cli.ps().await?;
        println!("{listing}");
        Ok(())
    }
}

/// Create each service's bind directory if missing. Idempotent.
pub fn provision_binds(layout: &DeploymentLayout) -> Result<()> {
    for path in layout.all_bind_dirs() {
        if path.is_dir() {
            continue;
        }
        fs::create_dir_all(&path).map_err(|e| StackError::io(&path, e))?;
        info!(bind = %path.display(), "created bind directory");
    }
    Ok(())
}

/// Normalize modes, hand the tree to the invoking user, then apply the
/// per-service ownership table to each bind directory.
pub fn fix_permissions(layout: &DeploymentLayout) -> Result<()> {
    fsops::normalize_modes(layout.root())?;

    if let Some((uid, gid)) = invoking_user() {
        fsops::chown_tree(layout.root(), uid, gid)?;
    }

    for service in SERVICES {
        let bind = layout.bind_dir(service.bind_dir);
        match service.owner {
            BindOwner::Uid { uid, gid } => fsops::chown_tree(&bind, uid, gid)?,
            BindOwner::RootLoosened { mode } => {
                fsops::chown_tree(&bind, 0, 0)?;
                fsops::set_mode(&bind, mode)?;
            }
        }
    }
    Ok(())
}

/// The installer must run as root to chown bind directories.
fn require_root() -> Result<()> {
    if !Uid::effective().is_root() {
        return Err(StackError::PrerequisiteMissing(
            "installer must run as root (sudo)".to_string(),
        ));
    }
    Ok(())
}

/// The real operator behind sudo, if any. The deployment tree as a whole is
/// owned by them rather than root so they can edit configs without sudo.
fn invoking_user() -> Option<(u32, u32)> {
    let uid = std::env::var("SUDO_UID").ok()?.parse().ok()?;
    let gid = std::env::var("SUDO_GID").ok()?.parse().ok()?;
    Some((uid, gid))
}
