//! Core library for the monitoring stack installer and lifecycle manager
//!
//! This crate provides the shared machinery for:
//! - The static service table (ports, health endpoints, bind ownership)
//! - Deployment root layout and install-state checks
//! - The `docker compose` CLI wrapper
//! - Installer steps (staging, bind provisioning, path rewrite, permissions)
//! - Lifecycle verbs, health probing, backup/restore, operational logging

pub mod backup;
pub mod compose;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod fsops;
pub mod health;
pub mod install;
pub mod layout;
pub mod lifecycle;
pub mod oplog;
pub mod services;

pub use config::StackConfig;
pub use error::{Result, StackError};
pub use health::{ServiceHealth, ServiceState};
pub use layout::DeploymentLayout;
pub use lifecycle::StackManager;
pub use services::{ServiceSpec, SERVICES};
