//! Host facts
//!
//! The resolver never reads the environment itself. A [`FactsProvider`] is asked for
//! everything up front and the answers are frozen into a [`HostFacts`] snapshot, so a
//! host without a usable loopback interface fails before any configuration is touched.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::process::Command;
use thiserror::Error;
use tracing::debug;

/// Errors raised while gathering host facts
#[derive(Debug, Error)]
pub enum FactsError {
    #[error("Loopback interface address unavailable: {0}")]
    MissingLoopback(String),

    #[error("Fact not available: {0}")]
    Unavailable(String),

    #[error("Failed to run {command}: {detail}")]
    CommandFailed { command: String, detail: String },
}

/// Source of host facts.
pub trait FactsProvider {
    /// Address assigned to the loopback interface.
    fn loopback_address(&self) -> Result<IpAddr, FactsError>;

    /// Lowercased kernel name in release naming (`linux`, `darwin`, ...).
    fn kernel(&self) -> Result<String, FactsError>;

    /// CPU architecture in release naming (`amd64`, `arm64`, ...).
    fn arch(&self) -> Result<String, FactsError>;
}

/// Frozen answers from a [`FactsProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostFacts {
    pub loopback_address: IpAddr,
    pub kernel: String,
    pub arch: String,
}

impl HostFacts {
    /// Query every fact once. The first failure aborts.
    pub fn gather(provider: &dyn FactsProvider) -> Result<Self, FactsError> {
        let facts = Self {
            loopback_address: provider.loopback_address()?,
            kernel: provider.kernel()?,
            arch: provider.arch()?,
        };
        debug!(
            loopback = %facts.loopback_address,
            kernel = %facts.kernel,
            arch = %facts.arch,
            "Gathered host facts"
        );
        Ok(facts)
    }
}

/// Optional fact pins from settings. Any pinned value wins over the host's answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactsPins {
    #[serde(default)]
    pub loopback_address: Option<String>,
    #[serde(default)]
    pub kernel: Option<String>,
    #[serde(default)]
    pub arch: Option<String>,
}

impl FactsPins {
    pub fn is_empty(&self) -> bool {
        self.loopback_address.is_none() && self.kernel.is_none() && self.arch.is_none()
    }
}

/// Facts read from the running host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFacts;

impl SystemFacts {
    pub fn new() -> Self {
        Self
    }
}

impl FactsProvider for SystemFacts {
    fn loopback_address(&self) -> Result<IpAddr, FactsError> {
        #[cfg(target_os = "linux")]
        let args: &[&str] = &["-o", "-4", "addr", "show", "dev", "lo"];
        #[cfg(target_os = "linux")]
        let program = "ip";

        #[cfg(not(target_os = "linux"))]
        let args: &[&str] = &["lo0"];
        #[cfg(not(target_os = "linux"))]
        let program = "ifconfig";

        let raw = run_command(program, args)?;
        parse_loopback_address(&raw).ok_or_else(|| {
            FactsError::MissingLoopback(format!("no inet address in `{} {}` output", program, args.join(" ")))
        })
    }

    fn kernel(&self) -> Result<String, FactsError> {
        Ok(release_kernel_name(std::env::consts::OS))
    }

    fn arch(&self) -> Result<String, FactsError> {
        Ok(release_arch_name(std::env::consts::ARCH))
    }
}

/// Fixed facts, for tests and hosts where introspection is not wanted.
#[derive(Debug, Clone, Default)]
pub struct StaticFacts {
    pub loopback_address: Option<IpAddr>,
    pub kernel: Option<String>,
    pub arch: Option<String>,
}

impl StaticFacts {
    pub fn new(loopback_address: IpAddr, kernel: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            loopback_address: Some(loopback_address),
            kernel: Some(kernel.into()),
            arch: Some(arch.into()),
        }
    }
}

impl FactsProvider for StaticFacts {
    fn loopback_address(&self) -> Result<IpAddr, FactsError> {
        self.loopback_address
            .ok_or_else(|| FactsError::MissingLoopback("no loopback address configured".to_string()))
    }

    fn kernel(&self) -> Result<String, FactsError> {
        self.kernel
            .clone()
            .ok_or_else(|| FactsError::Unavailable("kernel".to_string()))
    }

    fn arch(&self) -> Result<String, FactsError> {
        self.arch
            .clone()
            .ok_or_else(|| FactsError::Unavailable("arch".to_string()))
    }
}

/// Settings pins layered over another provider.
pub struct PinnedFacts<'a> {
    pins: &'a FactsPins,
    inner: &'a dyn FactsProvider,
}

impl<'a> PinnedFacts<'a> {
    pub fn new(pins: &'a FactsPins, inner: &'a dyn FactsProvider) -> Self {
        Self { pins, inner }
    }
}

impl FactsProvider for PinnedFacts<'_> {
    fn loopback_address(&self) -> Result<IpAddr, FactsError> {
        match &self.pins.loopback_address {
            Some(raw) => raw.parse().map_err(|e| {
                FactsError::MissingLoopback(format!("pinned address '{}' is invalid: {}", raw, e))
            }),
            None => self.inner.loopback_address(),
        }
    }

    fn kernel(&self) -> Result<String, FactsError> {
        match &self.pins.kernel {
            Some(kernel) => Ok(kernel.to_lowercase()),
            None => self.inner.kernel(),
        }
    }

    fn arch(&self) -> Result<String, FactsError> {
        match &self.pins.arch {
            Some(arch) => Ok(arch.clone()),
            None => self.inner.arch(),
        }
    }
}

fn run_command(program: &str, args: &[&str]) -> Result<String, FactsError> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|err| FactsError::CommandFailed {
            command: program.to_string(),
            detail: err.to_string(),
        })?;

    if !output.status.success() {
        return Err(FactsError::CommandFailed {
            command: format!("{} {}", program, args.join(" ")),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// First address following an `inet` token. Accepts both `ip -o addr` output
/// (`inet 127.0.0.1/8 scope host lo`) and `ifconfig` output (`inet 127.0.0.1 netmask ...`).
pub fn parse_loopback_address(raw: &str) -> Option<IpAddr> {
    raw.lines().find_map(|line| {
        let mut tokens = line.split_whitespace();
        while let Some(token) = tokens.next() {
            if token == "inet" {
                let addr = tokens.next()?;
                let addr = addr.split('/').next().unwrap_or(addr);
                if let Ok(ip) = addr.parse() {
                    return Some(ip);
                }
            }
        }
        None
    })
}

fn release_kernel_name(os: &str) -> String {
    match os {
        "macos" => "darwin".to_string(),
        other => other.to_lowercase(),
    }
}

fn release_arch_name(arch: &str) -> String {
    match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        other => other,
    }
    .to_string()
}
