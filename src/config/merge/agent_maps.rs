//! Agent configuration maps across settings layers.
//!
//! `config_defaults` and `config_hash` hold keys the agent reads verbatim, so they
//! bypass the `config` crate (which lowercases every key) and are read from each TOML
//! layer directly. Layers merge in the same order and by the same rule as the scalar
//! settings: tables key by key, everything else replaced.

use crate::config::sources::environment;
use crate::config::ProvisionConfig;
use crate::error::ApiError;
use crate::resolver::deep_merge;
use crate::value::{ConfigMap, ConfigValue};
use config::{Config, ConfigError};
use std::fs;
use std::path::Path;
use tracing::debug;

const MAP_KEYS: [&str; 2] = ["config_defaults", "config_hash"];

/// Both agent maps, accumulated layer by layer.
#[derive(Debug, Default)]
pub struct AgentMaps {
    config_defaults: ConfigMap,
    config_hash: ConfigMap,
}

impl AgentMaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay the maps found in one TOML document. `origin` names it in errors.
    pub fn overlay_toml(&mut self, text: &str, origin: &str) -> Result<(), ApiError> {
        let table: toml::Table = toml::from_str(text)
            .map_err(|e| ApiError::ConfigError(format!("{}: {}", origin, e)))?;

        for key in MAP_KEYS {
            let Some(value) = table.get(key) else {
                continue;
            };
            let layer = match ConfigValue::try_from(value.clone()) {
                Ok(ConfigValue::Mapping(map)) => map,
                Ok(other) => {
                    return Err(ApiError::ConfigError(format!(
                        "{}: {} must be a table, found {}",
                        origin,
                        key,
                        other.kind()
                    )))
                }
                Err(e) => {
                    return Err(ApiError::ConfigError(format!("{}: {}: {}", origin, key, e)))
                }
            };
            self.overlay(key, &layer);
        }
        Ok(())
    }

    /// Overlay the maps found in a TOML settings file.
    pub fn overlay_file(&mut self, path: &Path) -> Result<(), ApiError> {
        let text = fs::read_to_string(path).map_err(|e| {
            ApiError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        debug!(config_path = %path.display(), "Reading agent maps");
        self.overlay_toml(&text, &path.display().to_string())
    }

    /// Overlay `CLUSTERCONF__CONFIG_DEFAULTS__*` and `CLUSTERCONF__CONFIG_HASH__*`.
    pub fn overlay_environment(&mut self) -> Result<(), ApiError> {
        let env = Config::builder().add_source(environment::source()).build()?;
        for key in MAP_KEYS {
            match env.get::<ConfigMap>(key) {
                Ok(layer) => self.overlay(key, &layer),
                Err(ConfigError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Replace the maps `config` deserialized with the case-preserving ones.
    pub fn apply_to(self, config: &mut ProvisionConfig) {
        config.config_defaults = self.config_defaults;
        config.config_hash = self.config_hash;
    }

    fn overlay(&mut self, key: &str, layer: &ConfigMap) {
        let target = if key == "config_defaults" {
            &mut self.config_defaults
        } else {
            &mut self.config_hash
        };
        *target = deep_merge(target, layer);
    }
}
