//! Settings loader: assembles sources per merge policy and deserializes.

use super::merge::agent_maps::AgentMaps;
use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::ProvisionConfig;
use crate::error::ApiError;
use config::builder::DefaultState;
use config::{ConfigBuilder, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads [`ProvisionConfig`] from layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings for a workspace: defaults, global file, workspace files, environment.
    pub fn load(workspace_root: &Path) -> Result<ProvisionConfig, ApiError> {
        let layers: Vec<PathBuf> = global_file::existing_path()
            .into_iter()
            .chain(workspace_file::layer_paths(workspace_root))
            .collect();

        let config = Self::load_layers(&layers)?;
        debug!(workspace = %workspace_root.display(), "Settings loaded");
        Ok(config)
    }

    /// Load settings from one explicit file (required), plus defaults and environment.
    pub fn load_from_file(path: &Path) -> Result<ProvisionConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Settings file not found: {}",
                path.display()
            )));
        }
        let config = Self::load_layers(&[path.to_path_buf()])?;
        debug!(config_path = %path.display(), "Settings loaded from file");
        Ok(config)
    }

    /// Parse settings from TOML text over built-in defaults. Environment is not consulted.
    pub fn load_from_str(toml: &str) -> Result<ProvisionConfig, ApiError> {
        let mut config: ProvisionConfig = merge_policy::builder_with_defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        let mut maps = AgentMaps::new();
        maps.overlay_toml(toml, "inline settings")?;
        maps.apply_to(&mut config);
        Ok(config)
    }

    /// Location of the global settings file, if a config home can be determined.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    /// Defaults, then each TOML file in order, then the environment. Scalar settings
    /// come from `config`; the agent maps are read with their keys untouched.
    fn load_layers(layers: &[PathBuf]) -> Result<ProvisionConfig, ApiError> {
        let mut builder: ConfigBuilder<DefaultState> = merge_policy::builder_with_defaults()?;
        let mut maps = AgentMaps::new();
        for path in layers {
            debug!(config_path = %path.display(), "Adding settings file");
            builder = builder.add_source(File::from(path.clone()).required(true));
            maps.overlay_file(path)?;
        }
        let builder = environment::add_to_builder(builder)?;
        maps.overlay_environment()?;

        let mut config: ProvisionConfig = builder.build()?.try_deserialize()?;
        maps.apply_to(&mut config);
        Ok(config)
    }
}
