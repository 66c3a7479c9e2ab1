//! Integration tests for the clusterconf binary.
//!
//! Each run gets a cleared environment so settings come only from the files written here.
//! Facts are pinned and service notification is off, so no host tools are invoked.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const SETTINGS: &str = r#"
restart_on_change = false

[facts]
loopback_address = "127.0.0.1"
kernel = "linux"
arch = "amd64"

[config_defaults]
datacenter = "dc1"

[config_defaults.ports]
rpc = 8400

[config_hash]
server = true
client_addr = "10.0.0.9"
"#;

struct Workspace {
    _temp: TempDir,
    root: PathBuf,
    home: PathBuf,
    config_dir: PathBuf,
}

fn workspace(extra: &str) -> Workspace {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("ws");
    let home = temp.path().join("home");
    let config_dir = temp.path().join("etc");
    fs::create_dir_all(root.join("config")).unwrap();
    fs::create_dir_all(&home).unwrap();
    fs::write(
        root.join("config").join("config.toml"),
        format!(
            "config_dir = {:?}\n{}\n{}",
            config_dir.to_string_lossy(),
            extra,
            SETTINGS
        ),
    )
    .unwrap();
    Workspace {
        _temp: temp,
        root,
        home,
        config_dir,
    }
}

fn run(ws: &Workspace, args: &[&str]) -> Output {
    let bin = env!("CARGO_BIN_EXE_clusterconf");
    Command::new(bin)
        .env_clear()
        .env("HOME", &ws.home)
        .env("XDG_CONFIG_HOME", ws.home.join(".config"))
        .arg("--workspace")
        .arg(&ws.root)
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command should succeed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_render_prints_merged_json() {
    let ws = workspace("");
    let output = run(&ws, &["render"]);
    assert_success(&output);
    assert_eq!(
        stdout(&output),
        "{\"client_addr\":\"10.0.0.9\",\"datacenter\":\"dc1\",\"ports\":{\"rpc\":8400},\"server\":true}\n"
    );
}

#[test]
fn test_render_pretty_with_indent() {
    let ws = workspace("");
    let output = run(&ws, &["render", "--indent", "1"]);
    assert_success(&output);
    let text = stdout(&output);
    assert!(text.starts_with("{\n \"client_addr\""), "got: {}", text);
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["ports"]["rpc"], 8400);
}

#[test]
fn test_render_rejects_indent_above_maximum() {
    let ws = workspace("");
    let output = run(&ws, &["render", "--indent", "40"]);
    assert!(!output.status.success());
    assert!(stdout(&output).is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--indent: 40 exceeds maximum of 16"), "got: {}", stderr);
}

#[test]
fn test_derive_json() {
    let ws = workspace("");
    let output = run(&ws, &["derive", "--format", "json"]);
    assert_success(&output);
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed["derived"]["rpc_port"], 8400);
    assert_eq!(parsed["derived"]["rpc_addr"], "10.0.0.9");
    assert_eq!(parsed["derived"]["data_dir"], serde_json::Value::Null);
    assert_eq!(
        parsed["download_url"],
        "https://releases.hashicorp.com/consul/1.16.0/consul_1.16.0_linux_amd64.zip"
    );
}

#[test]
fn test_apply_writes_then_reports_unchanged() {
    let ws = workspace("");
    let config_file: &Path = &ws.config_dir.join("config.json");

    let first = run(&ws, &["apply", "--format", "json"]);
    assert_success(&first);
    let report: serde_json::Value = serde_json::from_str(&stdout(&first)).unwrap();
    assert_eq!(report["write"], "created");
    assert_eq!(report["notified"], serde_json::Value::Null);
    assert!(config_file.exists());

    let second = run(&ws, &["apply", "--format", "json"]);
    assert_success(&second);
    let report: serde_json::Value = serde_json::from_str(&stdout(&second)).unwrap();
    assert_eq!(report["write"], "unchanged");
}

#[test]
fn test_apply_dry_run_leaves_disk_untouched() {
    let ws = workspace("");
    let output = run(&ws, &["apply", "--dry-run"]);
    assert_success(&output);
    let text = stdout(&output);
    assert!(text.contains("Dry run"), "got: {}", text);
    assert!(text.contains("would be created"), "got: {}", text);
    assert!(!ws.config_dir.exists());
}

#[test]
fn test_validate_reports_errors() {
    let ws = workspace("config_mode = \"not-octal\"");
    let output = run(&ws, &["validate"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config_mode"), "got: {}", stderr);
}

#[test]
fn test_validate_ok() {
    let ws = workspace("");
    let output = run(&ws, &["validate"]);
    assert_success(&output);
    assert!(stdout(&output).contains("Settings valid."));
}
