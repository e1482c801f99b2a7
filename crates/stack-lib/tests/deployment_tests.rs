//! End-to-end filesystem tests for install, backup, and restore flows
//!
//! These exercise every step that does not require the docker engine or
//! root privileges: staging, bind provisioning, descriptor rewriting,
//! snapshot round-trips, and the not-installed guard.

use std::fs;
use std::path::Path;

use stack_lib::layout::DESCRIPTOR_FILE;
use stack_lib::{backup, descriptor, install, DeploymentLayout, StackError, SERVICES};

const SAMPLE_DESCRIPTOR: &str = "\
services:
  grafana:
    image: grafana/grafana:10.2.2
    volumes:
      - ./monitoring-binds/grafana-data:/var/lib/grafana
      - ./config/grafana:/etc/grafana
  prometheus:
    image: prom/prometheus:v2.48.0
    volumes:
      - ./monitoring-binds/prometheus-data:/prometheus
      - ./config/prometheus:/etc/prometheus
";

fn seeded_deployment(root: &Path) -> DeploymentLayout {
    let layout = DeploymentLayout::new(root);
    fs::create_dir_all(layout.config_dir().join("grafana")).unwrap();
    fs::write(layout.descriptor(), SAMPLE_DESCRIPTOR).unwrap();
    fs::write(
        layout.config_dir().join("grafana/grafana.ini"),
        "[server]\nhttp_port = 3000\n",
    )
    .unwrap();
    install::provision_binds(&layout).unwrap();
    layout
}

#[test]
fn provisioning_then_rewrite_produces_operable_root() {
    let dir = tempfile::tempdir().unwrap();
    let layout = seeded_deployment(dir.path());

    descriptor::rewrite_paths(&layout).unwrap();

    layout.ensure_installed().unwrap();
    let rewritten = fs::read_to_string(layout.descriptor()).unwrap();
    assert!(!rewritten.contains("./monitoring-binds/"));
    assert!(!rewritten.contains("./config/"));
    assert!(rewritten.contains(&format!(
        "{}/monitoring-binds/grafana-data:/var/lib/grafana",
        dir.path().display()
    )));

    for service in SERVICES {
        assert!(layout.bind_dir(service.bind_dir).is_dir());
    }
}

#[test]
fn double_provisioning_is_harmless() {
    let dir = tempfile::tempdir().unwrap();
    let layout = seeded_deployment(dir.path());
    let marker = layout.bind_dir("prometheus-data").join("wal");
    fs::write(&marker, "wal segment").unwrap();

    install::provision_binds(&layout).unwrap();

    assert_eq!(fs::read_to_string(&marker).unwrap(), "wal segment");
    assert_eq!(
        fs::read_dir(layout.binds_dir()).unwrap().count(),
        SERVICES.len()
    );
}

#[test]
fn backup_restore_round_trip_is_byte_exact() {
    let dir = tempfile::tempdir().unwrap();
    let layout = seeded_deployment(dir.path());
    fs::write(
        layout.bind_dir("grafana-data").join("grafana.db"),
        b"binary\x00payload",
    )
    .unwrap();

    let snapshot = backup::write_snapshot(&layout, "2.24.0".to_string()).unwrap();

    // Trash live state, then restore.
    fs::write(layout.bind_dir("grafana-data").join("grafana.db"), "junk").unwrap();
    fs::remove_file(layout.config_dir().join("grafana/grafana.ini")).unwrap();
    backup::apply_snapshot(&layout, &snapshot).unwrap();

    assert_eq!(
        fs::read(layout.bind_dir("grafana-data").join("grafana.db")).unwrap(),
        b"binary\x00payload"
    );
    assert_eq!(
        fs::read_to_string(layout.config_dir().join("grafana/grafana.ini")).unwrap(),
        "[server]\nhttp_port = 3000\n"
    );
}

#[test]
fn snapshots_are_listed_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let layout = seeded_deployment(dir.path());

    let first = backup::write_snapshot(&layout, String::new()).unwrap();
    // Snapshot names carry second-resolution timestamps.
    std::thread::sleep(std::time::Duration::from_millis(1100));
    let second = backup::write_snapshot(&layout, String::new()).unwrap();

    let entries = backup::list_snapshots(&layout).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].path, second);
    assert_eq!(entries[1].path, first);
}

#[test]
fn missing_deployment_is_rejected_before_any_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("deploy");
    let layout = DeploymentLayout::new(&root);

    let err = layout.ensure_installed().unwrap_err();
    assert!(matches!(err, StackError::NotInstalled(_)));
    assert!(!root.exists());
}

#[test]
fn descriptor_file_name_is_compose_conventional() {
    assert_eq!(DESCRIPTOR_FILE, "docker-compose.yml");
}
