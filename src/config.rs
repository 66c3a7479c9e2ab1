//! Settings
//!
//! The caller's parameter set: the two configuration maps to merge, where and how the
//! rendered file is written, which service to notify, and ambient logging settings.
//! Loaded from layered TOML files and environment variables by [`ConfigLoader`].

use crate::facts::FactsPins;
use crate::logging::LoggingConfig;
use crate::render::{parse_mode, RenderOptions, MAX_INDENT};
use crate::service::{validate_service_name, ServiceAction};
use crate::value::ConfigMap;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use thiserror::Error;

mod facade;
mod merge;
mod paths;
mod sources;

pub use facade::ConfigLoader;
pub use paths::{config_home, state_dir};
pub use sources::environment::PREFIX as ENV_PREFIX;
pub use sources::workspace_file::ENV_NAME_VAR;

/// Root settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Default agent configuration; overridden key by key by `config_hash`
    #[serde(default)]
    pub config_defaults: ConfigMap,

    /// User agent configuration, wins over `config_defaults`
    #[serde(default)]
    pub config_hash: ConfigMap,

    /// Directory holding the rendered file
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    #[serde(default = "default_config_file_name")]
    pub config_file_name: String,

    /// Octal permission string for the rendered file
    #[serde(default = "default_config_mode")]
    pub config_mode: String,

    #[serde(default)]
    pub pretty_config: bool,

    #[serde(default = "default_indent")]
    pub pretty_config_indent: usize,

    /// Notify the service when the rendered file changes
    #[serde(default = "default_true")]
    pub restart_on_change: bool,

    /// When false the service is never touched
    #[serde(default = "default_true")]
    pub manage_service: bool,

    #[serde(default = "default_service_name")]
    pub service_name: String,

    #[serde(default)]
    pub service_action: ServiceAction,

    /// Create the derived `data_dir` before writing the config
    #[serde(default)]
    pub manage_data_dir: bool,

    /// Release package name, used in the archive file name
    #[serde(default = "default_package_name")]
    pub package_name: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_download_url_base")]
    pub download_url_base: String,

    #[serde(default = "default_download_extension")]
    pub download_extension: String,

    /// Pinned host facts
    #[serde(default)]
    pub facts: FactsPins,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_config_dir() -> PathBuf {
    PathBuf::from("/etc/consul")
}

fn default_config_file_name() -> String {
    "config.json".to_string()
}

fn default_config_mode() -> String {
    "0664".to_string()
}

fn default_indent() -> usize {
    4
}

fn default_true() -> bool {
    true
}

fn default_service_name() -> String {
    "consul".to_string()
}

fn default_package_name() -> String {
    "consul".to_string()
}

fn default_version() -> String {
    "1.16.0".to_string()
}

fn default_download_url_base() -> String {
    "https://releases.hashicorp.com/consul/".to_string()
}

fn default_download_extension() -> String {
    "zip".to_string()
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            config_defaults: ConfigMap::new(),
            config_hash: ConfigMap::new(),
            config_dir: default_config_dir(),
            config_file_name: default_config_file_name(),
            config_mode: default_config_mode(),
            pretty_config: false,
            pretty_config_indent: default_indent(),
            restart_on_change: true,
            manage_service: true,
            service_name: default_service_name(),
            service_action: ServiceAction::default(),
            manage_data_dir: false,
            package_name: default_package_name(),
            version: default_version(),
            download_url_base: default_download_url_base(),
            download_extension: default_download_extension(),
            facts: FactsPins::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Settings validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl ProvisionConfig {
    /// Full path of the rendered file.
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(&self.config_file_name)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            pretty: self.pretty_config,
            indent: self.pretty_config_indent,
        }
    }

    /// Notification to send after a content change, if any.
    pub fn notify_action(&self) -> Option<ServiceAction> {
        if self.restart_on_change && self.manage_service {
            Some(self.service_action)
        } else {
            None
        }
    }

    /// Validate the entire settings set, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.config_dir.as_os_str().is_empty() {
            errors.push(ValidationError::new("config_dir", "cannot be empty"));
        }

        if self.config_file_name.is_empty() {
            errors.push(ValidationError::new("config_file_name", "cannot be empty"));
        } else if self.config_file_name.contains('/') || self.config_file_name.contains('\\') {
            errors.push(ValidationError::new(
                "config_file_name",
                format!("'{}' must not contain a path separator", self.config_file_name),
            ));
        }

        if let Err(e) = parse_mode(&self.config_mode) {
            errors.push(ValidationError::new("config_mode", e.to_string()));
        }

        if self.pretty_config_indent > MAX_INDENT {
            errors.push(ValidationError::new(
                "pretty_config_indent",
                format!("{} exceeds maximum of {}", self.pretty_config_indent, MAX_INDENT),
            ));
        }

        if self.manage_service {
            if let Err(e) = validate_service_name(&self.service_name) {
                errors.push(ValidationError::new("service_name", e.to_string()));
            }
        }

        if let Some(ref raw) = self.facts.loopback_address {
            if raw.parse::<IpAddr>().is_err() {
                errors.push(ValidationError::new(
                    "facts.loopback_address",
                    format!("'{}' is not an IP address", raw),
                ));
            }
        }

        if self.package_name.trim().is_empty() {
            errors.push(ValidationError::new("package_name", "cannot be empty"));
        } else if self.package_name.contains('/') {
            errors.push(ValidationError::new(
                "package_name",
                format!("'{}' must not contain '/'", self.package_name),
            ));
        }

        if self.version.trim().is_empty() {
            errors.push(ValidationError::new("version", "cannot be empty"));
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::new("logging", e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
