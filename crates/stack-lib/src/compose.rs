//! Wrapper around the `docker compose` CLI
//!
//! The orchestration engine is an opaque collaborator: the only contract
//! surface we consume is the process exit status (plus captured stdout where
//! a listing is needed). Anything non-zero becomes
//! [`StackError::ExternalToolFailure`].

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{Result, StackError};

/// Handle on the compose CLI bound to one service descriptor.
#[derive(Debug, Clone)]
pub struct ComposeCli {
    descriptor: PathBuf,
}

impl ComposeCli {
    pub fn new(descriptor: impl Into<PathBuf>) -> Self {
        Self {
            descriptor: descriptor.into(),
        }
    }

    pub fn descriptor(&self) -> &Path {
        &self.descriptor
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("docker");
        cmd.arg("compose").arg("-f").arg(&self.descriptor);
        cmd.args(args);
        cmd
    }

    async fn run(&self, args: &[&str]) -> Result<()> {
        let rendered = format!("docker compose {}", args.join(" "));
        debug!(command = %rendered, "invoking compose");
        let status = self
            .command(args)
            .status()
            .await
            .map_err(|e| StackError::io(&self.descriptor, e))?;
        check_status(&rendered, status.code())
    }

    async fn run_captured(&self, args: &[&str]) -> Result<String> {
        let rendered = format!("docker compose {}", args.join(" "));
        debug!(command = %rendered, "invoking compose (captured)");
        let output = self
            .command(args)
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|e| StackError::io(&self.descriptor, e))?;
        check_status(&rendered, output.status.code())?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Fetch the latest images for every service.
    pub async fn pull(&self) -> Result<()> {
        self.run(&["pull"]).await
    }

    /// Bring all services up in the background.
    pub async fn up(&self) -> Result<()> {
        self.run(&["up", "-d"]).await
    }

    /// Tear all services down.
    pub async fn down(&self) -> Result<()> {
        self.run(&["down"]).await
    }

    /// Human-readable container listing.
    pub async fn ps(&self) -> Result<String> {
        self.run_captured(&["ps"]).await
    }

    /// Names of services whose containers are currently running.
    pub async fn running_services(&self) -> Result<Vec<String>> {
        let out = self
            .run_captured(&["ps", "--status", "running", "--services"])
            .await?;
        Ok(out
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }

    /// Stream or tail logs for one service or the whole stack.
    pub async fn logs(&self, service: Option<&str>, follow: bool) -> Result<()> {
        let mut args = vec!["logs", "--tail", "100"];
        if follow {
            args.push("-f");
        }
        if let Some(name) = service {
            args.push(name);
        }
        self.run(&args).await
    }
}

fn check_status(command: &str, code: Option<i32>) -> Result<()> {
    match code {
        Some(0) => Ok(()),
        code => Err(StackError::ExternalToolFailure {
            command: command.to_string(),
            status: code.unwrap_or(-1),
        }),
    }
}

async fn run_docker(args: &[&str]) -> Result<()> {
    let rendered = format!("docker {}", args.join(" "));
    let status = Command::new("docker")
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| StackError::io("docker", e))?;
    check_status(&rendered, status.code())
}

/// `docker compose version --short`, for snapshot metadata.
pub async fn compose_version() -> Result<String> {
    let output = Command::new("docker")
        .args(["compose", "version", "--short"])
        .output()
        .await
        .map_err(|e| StackError::io("docker", e))?;
    check_status("docker compose version", output.status.code())?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// One-shot resource report for all running containers.
pub async fn stats() -> Result<()> {
    let status = Command::new("docker")
        .args(["stats", "--no-stream"])
        .status()
        .await
        .map_err(|e| StackError::io("docker", e))?;
    check_status("docker stats --no-stream", status.code())
}

/// Prune unused engine resources (stopped containers, dangling images,
/// unused networks).
pub async fn prune() -> Result<()> {
    run_docker(&["system", "prune", "-f"]).await
}

/// Verify the orchestration engine is usable before any install step runs.
///
/// Checks, in order: `docker` on PATH, the compose plugin responds, the
/// engine daemon answers `docker info`. If the daemon is down we warn and
/// attempt a `systemctl start docker` before giving up.
pub async fn preflight() -> Result<()> {
    which::which("docker").map_err(|_| {
        StackError::PrerequisiteMissing("`docker` not found on PATH".to_string())
    })?;

    run_docker(&["compose", "version"]).await.map_err(|_| {
        StackError::PrerequisiteMissing(
            "docker compose plugin is not available".to_string(),
        )
    })?;

    if run_docker(&["info"]).await.is_err() {
        warn!("docker daemon not responding, attempting to start it");
        let started = Command::new("systemctl")
            .args(["start", "docker"])
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false);
        if !started || run_docker(&["info"]).await.is_err() {
            return Err(StackError::PrerequisiteMissing(
                "docker daemon is not running and could not be started".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_status_ok() {
        check_status("docker compose ps", Some(0)).unwrap();
    }

    #[test]
    fn test_check_status_nonzero() {
        let err = check_status("docker compose up -d", Some(2)).unwrap_err();
        match err {
            StackError::ExternalToolFailure { command, status } => {
                assert_eq!(command, "docker compose up -d");
                assert_eq!(status, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_check_status_killed() {
        // A killed child has no exit code; report -1.
        let err = check_status("docker compose pull", None).unwrap_err();
        assert!(matches!(
            err,
            StackError::ExternalToolFailure { status: -1, .. }
        ));
    }
}
