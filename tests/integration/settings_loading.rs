//! Integration tests for layered settings loading

use clusterconf::config::ConfigLoader;
use clusterconf::render::{render, RenderOptions};
use clusterconf::resolver::resolve;
use clusterconf::service::ServiceAction;
use clusterconf::value::{lookup, ConfigValue};
use std::fs;
use tempfile::TempDir;

use crate::integration::with_isolated_env;

fn write(path: &std::path::Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_load_without_any_files_uses_defaults() {
    let temp = TempDir::new().unwrap();
    let workspace = temp.path().join("ws");
    fs::create_dir_all(&workspace).unwrap();

    let config = with_isolated_env(&temp, || ConfigLoader::load(&workspace).unwrap());
    assert!(config.config_defaults.is_empty());
    assert!(config.config_hash.is_empty());
    assert_eq!(config.config_file_name, "config.json");
    assert_eq!(config.config_mode, "0664");
    assert_eq!(config.service_action, ServiceAction::Reload);
    assert!(config.validate().is_ok());
}

#[test]
fn test_global_file_is_loaded() {
    let temp = TempDir::new().unwrap();
    let workspace = temp.path().join("ws");
    fs::create_dir_all(&workspace).unwrap();
    write(
        &temp.path().join("xdg").join("clusterconf").join("config.toml"),
        r#"
service_name = "consul-agent"

[config_defaults]
datacenter = "global-dc"
"#,
    );

    let config = with_isolated_env(&temp, || {
        assert_eq!(
            ConfigLoader::global_config_path().unwrap(),
            temp.path().join("xdg").join("clusterconf").join("config.toml")
        );
        ConfigLoader::load(&workspace).unwrap()
    });
    assert_eq!(config.service_name, "consul-agent");
    assert_eq!(
        config.config_defaults.get("datacenter"),
        Some(&ConfigValue::String("global-dc".to_string()))
    );
}

#[test]
fn test_workspace_overrides_global_and_tables_merge() {
    let temp = TempDir::new().unwrap();
    let workspace = temp.path().join("ws");
    write(
        &temp.path().join("xdg").join("clusterconf").join("config.toml"),
        r#"
[config_defaults]
datacenter = "global-dc"
log_level = "INFO"
"#,
    );
    write(
        &workspace.join("config").join("config.toml"),
        r#"
pretty_config = true

[config_defaults]
datacenter = "workspace-dc"
"#,
    );

    let config = with_isolated_env(&temp, || ConfigLoader::load(&workspace).unwrap());
    assert!(config.pretty_config);
    assert_eq!(
        config.config_defaults.get("datacenter"),
        Some(&ConfigValue::String("workspace-dc".to_string()))
    );
    assert_eq!(
        config.config_defaults.get("log_level"),
        Some(&ConfigValue::String("INFO".to_string()))
    );
}

#[test]
fn test_environment_specific_file_wins() {
    let temp = TempDir::new().unwrap();
    let workspace = temp.path().join("ws");
    write(
        &workspace.join("config").join("config.toml"),
        "restart_on_change = true\n",
    );
    write(
        &workspace.join("config").join("production.toml"),
        "restart_on_change = false\n",
    );

    let config = with_isolated_env(&temp, || {
        std::env::set_var("CLUSTERCONF_ENV", "production");
        ConfigLoader::load(&workspace).unwrap()
    });
    assert!(!config.restart_on_change);
}

#[test]
fn test_environment_variables_override_files() {
    let temp = TempDir::new().unwrap();
    let workspace = temp.path().join("ws");
    write(
        &workspace.join("config").join("config.toml"),
        r#"
pretty_config_indent = 2

[config_hash.ports]
rpc = 8300
"#,
    );

    let config = with_isolated_env(&temp, || {
        std::env::set_var("CLUSTERCONF__PRETTY_CONFIG_INDENT", "8");
        std::env::set_var("CLUSTERCONF__CONFIG_HASH__PORTS__RPC", "9999");
        ConfigLoader::load(&workspace).unwrap()
    });
    assert_eq!(config.pretty_config_indent, 8);
    assert_eq!(
        lookup(&config.config_hash, &["ports", "rpc"]),
        Some(&ConfigValue::Int(9999))
    );
}

#[test]
fn test_load_from_explicit_file_skips_workspace() {
    let temp = TempDir::new().unwrap();
    let workspace = temp.path().join("ws");
    write(
        &workspace.join("config").join("config.toml"),
        "service_name = \"from-workspace\"\n",
    );
    let explicit = temp.path().join("explicit.toml");
    write(&explicit, "config_dir = \"/opt/consul/etc\"\n");

    let config = with_isolated_env(&temp, || ConfigLoader::load_from_file(&explicit).unwrap());
    assert_eq!(config.service_name, "consul");
    assert_eq!(
        config.config_path(),
        std::path::PathBuf::from("/opt/consul/etc/config.json")
    );
}

#[test]
fn test_invalid_settings_surface_in_validate() {
    let temp = TempDir::new().unwrap();
    let explicit = temp.path().join("bad.toml");
    write(
        &explicit,
        r#"
config_mode = "abc"
pretty_config_indent = 64
"#,
    );

    let config = with_isolated_env(&temp, || ConfigLoader::load_from_file(&explicit).unwrap());
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_mixed_case_agent_keys_survive_into_rendered_file() {
    let temp = TempDir::new().unwrap();
    let workspace = temp.path().join("ws");
    write(
        &temp.path().join("xdg").join("clusterconf").join("config.toml"),
        r#"
[config_defaults.node_meta]
instanceType = "m5"
"#,
    );
    write(
        &workspace.join("config").join("config.toml"),
        r#"
[config_hash.node_meta]
Rack = "r1"
rack = "r2"
"#,
    );

    let config = with_isolated_env(&temp, || ConfigLoader::load(&workspace).unwrap());
    assert_eq!(
        lookup(&config.config_defaults, &["node_meta", "instanceType"]),
        Some(&ConfigValue::String("m5".to_string()))
    );

    let resolved = resolve(&config.config_defaults, &config.config_hash);
    let rendered = render(&resolved, &RenderOptions::default()).unwrap();
    assert_eq!(
        rendered,
        "{\"node_meta\":{\"Rack\":\"r1\",\"instanceType\":\"m5\",\"rack\":\"r2\"}}\n"
    );
}
