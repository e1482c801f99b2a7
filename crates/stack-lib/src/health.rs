//! Per-service health probing for the `status` verb
//!
//! A service is classified by two facts: whether the orchestration engine
//! reports its container running, and (when it has a health endpoint)
//! whether a plain GET against that endpoint returns 2xx.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::compose::ComposeCli;
use crate::error::Result;
use crate::services::{ServiceSpec, SERVICES};

/// Classification of one service.
///
/// Services with a health endpoint report exactly one of `Healthy`,
/// `Unhealthy`, `NotRunning`. Graphite has no endpoint and reports
/// `Running` or `NotRunning` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceState {
    Healthy,
    Unhealthy,
    Running,
    NotRunning,
}

impl ServiceState {
    pub fn is_up(&self) -> bool {
        !matches!(self, ServiceState::NotRunning)
    }
}

/// Status of one service, as reported by `status`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealth {
    pub service: &'static str,
    pub port: u16,
    pub state: ServiceState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Probe every service in the table.
pub async fn check_stack(cli: &ComposeCli, probe_timeout: Duration) -> Result<Vec<ServiceHealth>> {
    let running = cli.running_services().await?;
    let client = reqwest::Client::builder().timeout(probe_timeout).build()?;

    let mut report = Vec::with_capacity(SERVICES.len());
    for service in SERVICES {
        let is_running = running.iter().any(|name| name == service.name);
        report.push(check_service(&client, service, is_running).await);
    }
    Ok(report)
}

async fn check_service(
    client: &reqwest::Client,
    service: &'static ServiceSpec,
    is_running: bool,
) -> ServiceHealth {
    let (state, detail) = match (is_running, service.health_url()) {
        (false, _) => (ServiceState::NotRunning, None),
        (true, None) => (ServiceState::Running, None),
        (true, Some(url)) => probe(client, &url).await,
    };
    debug!(service = service.name, ?state, "service probed");
    ServiceHealth {
        service: service.name,
        port: service.port,
        state,
        detail,
    }
}

/// Any 2xx-class response counts as healthy.
async fn probe(client: &reqwest::Client, url: &str) -> (ServiceState, Option<String>) {
    match client.get(url).send().await {
        Ok(resp) if resp.status().is_success() => (ServiceState::Healthy, None),
        Ok(resp) => (
            ServiceState::Unhealthy,
            Some(format!("HTTP {}", resp.status().as_u16())),
        ),
        Err(err) => (
            ServiceState::Unhealthy,
            Some(if err.is_timeout() {
                "probe timed out".to_string()
            } else {
                "connection refused".to_string()
            }),
        ),
    }
}
