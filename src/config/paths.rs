//! Well-known directories.

use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// `$XDG_CONFIG_HOME` when set to an absolute path, otherwise `~/.config`.
pub fn config_home() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        if xdg.is_absolute() {
            return Some(xdg);
        }
    }
    if let Some(home) = std::env::var_os("HOME").filter(|h| !h.is_empty()) {
        return Some(PathBuf::from(home).join(".config"));
    }
    BaseDirs::new().map(|dirs| dirs.home_dir().join(".config"))
}

/// Per-user state directory for clusterconf (log files).
pub fn state_dir() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "clusterconf")?;
    Some(
        dirs.state_dir()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| dirs.data_local_dir().to_path_buf()),
    )
}
