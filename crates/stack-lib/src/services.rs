//! Static service table for the monitoring stack
//!
//! Every per-service fact the installer and manager need — runtime UID/GID
//! for the bind directory, health endpoint, published port, access
//! credentials — lives in this one table. Adding a service is a single-row
//! edit here plus a compose entry.

use serde::Serialize;

/// Ownership applied to a service's bind directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOwner {
    /// Chown to the numeric UID/GID the container process runs as.
    Uid { uid: u32, gid: u32 },
    /// Leave root-owned but loosen the mode so the container can write.
    ///
    /// Graphite's container runs its writers as root; the upstream image has
    /// no dedicated runtime user, so we keep root ownership and open the
    /// mode instead of inventing a UID.
    RootLoosened { mode: u32 },
}

/// One managed service.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ServiceSpec {
    /// Compose service name.
    pub name: &'static str,
    /// Host port the service publishes.
    pub port: u16,
    /// Well-known health path, probed with a plain GET. `None` means the
    /// service has no health endpoint and is reported running-only.
    pub health_path: Option<&'static str>,
    /// Bind directory name under `monitoring-binds/`.
    pub bind_dir: &'static str,
    /// Ownership policy for the bind directory.
    #[serde(skip)]
    pub owner: BindOwner,
    /// Short operator-facing access note (credentials, protocol).
    pub access: &'static str,
}

impl ServiceSpec {
    /// True when `status` can probe an HTTP health endpoint.
    pub fn has_health_endpoint(&self) -> bool {
        self.health_path.is_some()
    }

    /// Probe URL for the health endpoint, if any.
    pub fn health_url(&self) -> Option<String> {
        self.health_path
            .map(|path| format!("http://localhost:{}{}", self.port, path))
    }
}

/// The full stack, in bring-up order.
pub const SERVICES: &[ServiceSpec] = &[
    ServiceSpec {
        name: "influxdb",
        port: 8086,
        health_path: Some("/ping"),
        bind_dir: "influxdb-data",
        owner: BindOwner::Uid { uid: 1500, gid: 1500 },
        access: "http://localhost:8086 (no auth by default)",
    },
    ServiceSpec {
        name: "prometheus",
        port: 9090,
        health_path: Some("/-/healthy"),
        bind_dir: "prometheus-data",
        owner: BindOwner::Uid { uid: 9090, gid: 9090 },
        access: "http://localhost:9090 (no auth)",
    },
    ServiceSpec {
        name: "alertmanager",
        port: 9093,
        health_path: Some("/-/healthy"),
        bind_dir: "alertmanager-data",
        owner: BindOwner::Uid { uid: 9093, gid: 9093 },
        access: "http://localhost:9093 (no auth)",
    },
    ServiceSpec {
        name: "pushgateway",
        port: 9091,
        health_path: Some("/-/healthy"),
        bind_dir: "pushgateway-data",
        owner: BindOwner::Uid { uid: 9091, gid: 9091 },
        access: "http://localhost:9091 (no auth)",
    },
    ServiceSpec {
        name: "graphite",
        port: 8080,
        health_path: None,
        bind_dir: "graphite-data",
        owner: BindOwner::RootLoosened { mode: 0o777 },
        access: "web http://localhost:8080, plaintext ingest on :2003",
    },
    ServiceSpec {
        name: "grafana",
        port: 3000,
        health_path: Some("/api/health"),
        bind_dir: "grafana-data",
        owner: BindOwner::Uid { uid: 472, gid: 472 },
        access: "http://localhost:3000 (admin / admin, change on first login)",
    },
];

/// Look up a service by compose name.
pub fn find(name: &str) -> Option<&'static ServiceSpec> {
    SERVICES.iter().find(|s| s.name == name)
}
