//! Runtime configuration
//!
//! Everything has a sensible default; overrides come from `MONSTACK_*`
//! environment variables.

use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;

/// Configuration shared by the installer and the manager.
#[derive(Debug, Clone, Deserialize)]
pub struct StackConfig {
    /// Deployment root the stack is installed into.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Source tree the installer stages files from.
    #[serde(default = "default_source")]
    pub source: PathBuf,

    /// Seconds to wait after bring-up before reporting status.
    #[serde(default = "default_grace_secs")]
    pub startup_grace_secs: u64,

    /// Timeout for a single health probe, in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Operational log is truncated once it grows past this many bytes.
    #[serde(default = "default_log_max_bytes")]
    pub log_max_bytes: u64,
}

fn default_root() -> PathBuf {
    PathBuf::from("/opt/monstack")
}

fn default_source() -> PathBuf {
    PathBuf::from(".")
}

fn default_grace_secs() -> u64 {
    10
}

fn default_probe_timeout_ms() -> u64 {
    2_000
}

fn default_log_max_bytes() -> u64 {
    1024 * 1024
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            source: default_source(),
            startup_grace_secs: default_grace_secs(),
            probe_timeout_ms: default_probe_timeout_ms(),
            log_max_bytes: default_log_max_bytes(),
        }
    }
}

impl StackConfig {
    /// Load configuration from `MONSTACK_*` environment variables.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("MONSTACK"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = StackConfig::default();
        assert_eq!(cfg.root, PathBuf::from("/opt/monstack"));
        assert_eq!(cfg.startup_grace_secs, 10);
        assert_eq!(cfg.probe_timeout_ms, 2_000);
        assert_eq!(cfg.log_max_bytes, 1024 * 1024);
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let cfg = StackConfig::load().unwrap();
        assert_eq!(cfg.probe_timeout_ms, 2_000);
    }
}
