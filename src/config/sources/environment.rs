//! Environment source: CLUSTERCONF__<KEY>[__<SUBKEY>...]
//!
//! `CLUSTERCONF__PRETTY_CONFIG=true` sets `pretty_config`;
//! `CLUSTERCONF__CONFIG_HASH__PORTS__RPC=9999` sets `config_hash.ports.rpc`.
//! Values that parse as booleans or integers are typed accordingly. Key segments are
//! lowercased, so agent keys set this way are always lowercase.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

pub const PREFIX: &str = "CLUSTERCONF";
pub const SEPARATOR: &str = "__";

pub fn source() -> Environment {
    Environment::with_prefix(PREFIX)
        .prefix_separator(SEPARATOR)
        .separator(SEPARATOR)
        .try_parsing(true)
}

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(source()))
}
