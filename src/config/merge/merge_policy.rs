//! Merge rules: defaults, override order, conflict handling.
//!
//! Sources are layered in this order, later wins per key (tables merge key by key):
//! built-in defaults, global file, workspace `config/config.toml`,
//! workspace `config/{CLUSTERCONF_ENV}.toml`, `CLUSTERCONF__*` environment variables.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("config_dir", "/etc/consul")?
        .set_default("config_file_name", "config.json")?
        .set_default("config_mode", "0664")?
        .set_default("pretty_config", false)?
        .set_default("pretty_config_indent", 4)?
        .set_default("restart_on_change", true)?
        .set_default("manage_service", true)?
        .set_default("service_name", "consul")?
        .set_default("service_action", "reload")?
        .set_default("manage_data_dir", false)?
        .set_default("package_name", "consul")?
        .set_default("version", "1.16.0")?
        .set_default("download_url_base", "https://releases.hashicorp.com/consul/")?
        .set_default("download_extension", "zip")
}
