//! Global settings file: $XDG_CONFIG_HOME/clusterconf/config.toml or ~/.config/clusterconf/config.toml

use crate::config::paths;
use std::path::PathBuf;
use tracing::debug;

/// Path to global settings file.
pub fn global_config_path() -> Option<PathBuf> {
    paths::config_home().map(|home| home.join("clusterconf").join("config.toml"))
}

/// Canonical path of the global settings file, if it exists.
pub fn existing_path() -> Option<PathBuf> {
    let global_path = global_config_path()?;
    if global_path.exists() {
        Some(
            global_path
                .canonicalize()
                .unwrap_or_else(|_| global_path.clone()),
        )
    } else {
        debug!(
            config_path = %global_path.display(),
            "No global settings file; using built-in defaults"
        );
        None
    }
}
