//! Derive and validate command presentation.

use crate::config::ProvisionConfig;
use crate::provision::Resolution;
use serde_json::json;

pub fn format_derived_text(resolution: &Resolution) -> String {
    let derived = &resolution.derived;
    let mut output = String::from("Derived fields:\n");
    output.push_str(&format!(
        "  data_dir:  {}\n",
        derived.data_dir.as_deref().unwrap_or("(not set)")
    ));
    output.push_str(&format!("  rpc_port:  {}\n", derived.rpc_port));
    output.push_str(&format!("  rpc_addr:  {}\n", derived.rpc_addr));
    output.push('\n');
    output.push_str("Host facts:\n");
    output.push_str(&format!("  loopback:  {}\n", resolution.facts.loopback_address));
    output.push_str(&format!("  kernel:    {}\n", resolution.facts.kernel));
    output.push_str(&format!("  arch:      {}\n", resolution.facts.arch));
    output.push('\n');
    output.push_str(&format!("Download URL: {}", resolution.download_url));
    output
}

pub fn format_derived_json(resolution: &Resolution) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "derived": resolution.derived,
        "facts": resolution.facts,
        "download_url": resolution.download_url,
    }))
}

pub fn format_validation_ok(settings: &ProvisionConfig) -> String {
    let notify = match settings.notify_action() {
        Some(action) => format!("{} {} on change", action, settings.service_name),
        None => "disabled".to_string(),
    };
    format!(
        "Settings valid.\n  config file: {}\n  mode:        {}\n  defaults:    {} keys\n  overrides:   {} keys\n  notify:      {}",
        settings.config_path().display(),
        settings.config_mode,
        settings.config_defaults.len(),
        settings.config_hash.len(),
        notify,
    )
}
