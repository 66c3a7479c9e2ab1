//! Service manager notification
//!
//! Only the notification side of service supervision lives here: after the config
//! file changes the agent is told to reload or restart. Starting, stopping and
//! installing units is left to the host's service manager.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::process::Command;
use thiserror::Error;
use tracing::{info, warn};

/// Errors from service operations
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Failed to spawn {program}: {detail}")]
    SpawnFailed { program: String, detail: String },

    #[error("{command} failed: {detail}")]
    CommandFailed { command: String, detail: String },

    #[error("Invalid service name: {0}")]
    InvalidName(String),
}

/// How the agent is told about a new config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceAction {
    Reload,
    Restart,
}

impl Default for ServiceAction {
    fn default() -> Self {
        ServiceAction::Reload
    }
}

impl ServiceAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceAction::Reload => "reload",
            ServiceAction::Restart => "restart",
        }
    }
}

impl std::fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that can reload or restart a named service.
pub trait ServiceManager {
    fn reload(&self, service: &str) -> Result<(), ServiceError>;

    fn restart(&self, service: &str) -> Result<(), ServiceError>;

    fn notify(&self, service: &str, action: ServiceAction) -> Result<(), ServiceError> {
        match action {
            ServiceAction::Reload => self.reload(service),
            ServiceAction::Restart => self.restart(service),
        }
    }
}

/// systemd-backed manager driving `systemctl`.
#[derive(Debug, Clone)]
pub struct SystemdService {
    systemctl: String,
}

impl SystemdService {
    pub fn new() -> Self {
        Self {
            systemctl: "systemctl".to_string(),
        }
    }

    /// Use an alternate `systemctl` binary.
    pub fn with_binary(systemctl: impl Into<String>) -> Self {
        Self {
            systemctl: systemctl.into(),
        }
    }

    fn run(&self, verb: &str, service: &str) -> Result<(), ServiceError> {
        validate_service_name(service)?;

        let output = Command::new(&self.systemctl)
            .args([verb, service])
            .output()
            .map_err(|err| ServiceError::SpawnFailed {
                program: self.systemctl.clone(),
                detail: err.to_string(),
            })?;

        if output.status.success() {
            info!(service = %service, action = %verb, "Service notified");
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let detail = if stderr.trim().is_empty() { stdout } else { stderr };
        warn!(service = %service, action = %verb, detail = %detail.trim(), "Service notification failed");
        Err(ServiceError::CommandFailed {
            command: format!("{} {} {}", self.systemctl, verb, service),
            detail: detail.trim().to_string(),
        })
    }
}

impl Default for SystemdService {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceManager for SystemdService {
    fn reload(&self, service: &str) -> Result<(), ServiceError> {
        self.run("reload", service)
    }

    fn restart(&self, service: &str) -> Result<(), ServiceError> {
        self.run("restart", service)
    }
}

/// Records notifications instead of performing them.
#[derive(Debug, Default)]
pub struct RecordingService {
    calls: Mutex<Vec<(String, ServiceAction)>>,
}

impl RecordingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(String, ServiceAction)> {
        self.calls.lock().clone()
    }
}

impl ServiceManager for RecordingService {
    fn reload(&self, service: &str) -> Result<(), ServiceError> {
        self.calls
            .lock()
            .push((service.to_string(), ServiceAction::Reload));
        Ok(())
    }

    fn restart(&self, service: &str) -> Result<(), ServiceError> {
        self.calls
            .lock()
            .push((service.to_string(), ServiceAction::Restart));
        Ok(())
    }
}

/// Unit names are passed as a single argv entry; reject anything that is not a plain name.
pub fn validate_service_name(service: &str) -> Result<(), ServiceError> {
    let valid = !service.is_empty()
        && !service.starts_with('-')
        && service
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@' | ':'));
    if valid {
        Ok(())
    } else {
        Err(ServiceError::InvalidName(service.to_string()))
    }
}
