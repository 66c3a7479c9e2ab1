//! Deep merge: overrides laid over defaults, recursing only where both sides are mappings.

use crate::value::{ConfigMap, ConfigValue};
use serde::{Deserialize, Serialize};

/// Result of merging overrides over defaults. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedConfig(ConfigMap);

impl ResolvedConfig {
    pub fn as_map(&self) -> &ConfigMap {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> ConfigMap {
        self.0
    }
}

impl From<ConfigMap> for ResolvedConfig {
    fn from(map: ConfigMap) -> Self {
        Self(map)
    }
}

/// Merge `overrides` over `defaults` and wrap the result.
pub fn resolve(defaults: &ConfigMap, overrides: &ConfigMap) -> ResolvedConfig {
    ResolvedConfig(deep_merge(defaults, overrides))
}

/// Merge two maps without touching either input.
///
/// For a key present on both sides, two mappings merge recursively; any other pairing
/// (scalar, sequence, or mismatched kinds) takes the override value as-is. Sequences
/// are replaced, never concatenated.
pub fn deep_merge(defaults: &ConfigMap, overrides: &ConfigMap) -> ConfigMap {
    let mut merged = defaults.clone();
    for (key, override_value) in overrides {
        let next = match (merged.get(key), override_value) {
            (Some(ConfigValue::Mapping(base)), ConfigValue::Mapping(over)) => {
                ConfigValue::Mapping(deep_merge(base, over))
            }
            _ => override_value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}
