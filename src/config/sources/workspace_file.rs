//! Workspace settings files: config/config.toml and config/{env}.toml

use std::path::{Path, PathBuf};

/// Environment variable selecting the per-environment settings file.
pub const ENV_NAME_VAR: &str = "CLUSTERCONF_ENV";

/// Existing workspace settings files, lowest precedence first:
/// config/config.toml (base) then config/{CLUSTERCONF_ENV}.toml (env-specific).
pub fn layer_paths(workspace_root: &Path) -> Vec<PathBuf> {
    let config_dir = workspace_root.join("config");
    let env_name = std::env::var(ENV_NAME_VAR).unwrap_or_else(|_| "development".to_string());

    [
        config_dir.join("config.toml"),
        config_dir.join(format!("{}.toml", env_name)),
    ]
    .into_iter()
    .filter(|path| path.exists())
    .collect()
}
