//! Integration tests for the provisioning pipeline: settings in, file and notifications out

use clusterconf::config::{ConfigLoader, ProvisionConfig};
use clusterconf::facts::StaticFacts;
use clusterconf::provision::{Provisioner, Stage};
use clusterconf::render::WriteOutcome;
use clusterconf::service::{RecordingService, ServiceAction};
use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use tempfile::TempDir;

fn facts() -> StaticFacts {
    StaticFacts::new(IpAddr::V4(Ipv4Addr::LOCALHOST), "linux", "amd64")
}

fn settings(dir: &Path, body: &str) -> ProvisionConfig {
    let mut config = ConfigLoader::load_from_str(body).unwrap();
    config.config_dir = dir.join("consul.d");
    config
}

#[test]
fn test_overrides_merge_into_rendered_file() {
    let temp = TempDir::new().unwrap();
    let settings = settings(
        temp.path(),
        r#"
pretty_config = true
pretty_config_indent = 2

[config_defaults]
datacenter = "dc1"
retry_join = ["10.0.0.1", "10.0.0.2"]

[config_defaults.ports]
rpc = 8400
http = 8500

[config_hash]
retry_join = ["10.0.0.3"]

[config_hash.ports]
rpc = 9999
"#,
    );
    let facts = facts();
    let service = RecordingService::new();

    let report = Provisioner::new(&facts, &service).run(&settings, false).unwrap();
    assert_eq!(report.derived.rpc_port, 9999);
    assert_eq!(report.derived.rpc_addr, "127.0.0.1");

    let written = fs::read_to_string(temp.path().join("consul.d").join("config.json")).unwrap();
    assert_eq!(
        written,
        r#"{
  "datacenter": "dc1",
  "ports": {
    "http": 8500,
    "rpc": 9999
  },
  "retry_join": [
    "10.0.0.3"
  ]
}
"#
    );
}

#[test]
fn test_change_detection_drives_notification() {
    let temp = TempDir::new().unwrap();
    let facts = facts();
    let service = RecordingService::new();
    let provisioner = Provisioner::new(&facts, &service);

    let mut settings = settings(
        temp.path(),
        r#"
service_action = "restart"

[config_hash]
server = true
"#,
    );

    let first = provisioner.run(&settings, false).unwrap();
    assert_eq!(first.write, WriteOutcome::Created);
    assert_eq!(first.notified, Some(ServiceAction::Restart));

    let second = provisioner.run(&settings, false).unwrap();
    assert_eq!(second.write, WriteOutcome::Unchanged);
    assert_eq!(second.notified, None);
    assert!(!second.stages.contains(&Stage::NotifyService));

    settings.config_hash = ConfigLoader::load_from_str("[config_hash]\nserver = false\n")
        .unwrap()
        .config_hash;
    let third = provisioner.run(&settings, false).unwrap();
    assert_eq!(third.write, WriteOutcome::Updated);
    assert_eq!(third.notified, Some(ServiceAction::Restart));

    assert_eq!(
        service.calls(),
        vec![
            ("consul".to_string(), ServiceAction::Restart),
            ("consul".to_string(), ServiceAction::Restart),
        ]
    );
}

#[test]
fn test_pretty_toggle_alone_rewrites_file() {
    let temp = TempDir::new().unwrap();
    let facts = facts();
    let service = RecordingService::new();
    let provisioner = Provisioner::new(&facts, &service);

    let mut settings = settings(temp.path(), "[config_hash]\nserver = true\n");
    provisioner.run(&settings, false).unwrap();

    settings.pretty_config = true;
    let report = provisioner.run(&settings, false).unwrap();
    assert_eq!(report.write, WriteOutcome::Updated);
    assert_eq!(service.calls().len(), 2);
}

#[test]
fn test_derived_address_precedence_end_to_end() {
    let temp = TempDir::new().unwrap();
    let facts = facts();
    let service = RecordingService::new();
    let provisioner = Provisioner::new(&facts, &service);

    let both = settings(
        temp.path(),
        r#"
[config_hash]
client_addr = "10.0.0.9"

[config_hash.addresses]
rpc = "10.0.0.5"
"#,
    );
    assert_eq!(provisioner.resolve(&both).unwrap().derived.rpc_addr, "10.0.0.5");

    let client_only = settings(temp.path(), "[config_hash]\nclient_addr = \"10.0.0.9\"\n");
    assert_eq!(
        provisioner.resolve(&client_only).unwrap().derived.rpc_addr,
        "10.0.0.9"
    );

    let neither = settings(temp.path(), "");
    assert_eq!(
        provisioner.resolve(&neither).unwrap().derived.rpc_addr,
        "127.0.0.1"
    );
}

#[test]
fn test_pinned_facts_replace_host_lookup() {
    let temp = TempDir::new().unwrap();
    let facts = StaticFacts::default();
    let service = RecordingService::new();

    let settings = settings(
        temp.path(),
        r#"
[facts]
loopback_address = "127.0.0.2"
kernel = "Linux"
arch = "arm64"
"#,
    );
    let report = Provisioner::new(&facts, &service).run(&settings, true).unwrap();
    assert_eq!(report.derived.rpc_addr, "127.0.0.2");
    assert_eq!(
        report.download_url,
        "https://releases.hashicorp.com/consul/1.16.0/consul_1.16.0_linux_arm64.zip"
    );
}

#[cfg(unix)]
#[test]
fn test_file_mode_applied() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let facts = facts();
    let service = RecordingService::new();
    let settings = settings(temp.path(), "config_mode = \"0640\"\n");

    Provisioner::new(&facts, &service).run(&settings, false).unwrap();
    let mode = fs::metadata(settings.config_path())
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o640);
}
