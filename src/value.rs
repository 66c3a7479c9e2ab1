//! Configuration values
//!
//! Loosely-typed configuration trees as a closed set of variants. Keys are kept in a
//! `BTreeMap` so iteration and serialized output are always sorted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// String-keyed mapping of configuration values.
pub type ConfigMap = BTreeMap<String, ConfigValue>;

/// A single configuration value.
///
/// Serializes as the plain underlying value (no tag), so a `ConfigMap` renders as an
/// ordinary JSON object. `null` and floating point numbers are not representable and
/// fail to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    String(String),
    Sequence(Vec<ConfigValue>),
    Mapping(ConfigMap),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&ConfigMap> {
        match self {
            ConfigValue::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Short type name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigValue::Bool(_) => "boolean",
            ConfigValue::Int(_) => "integer",
            ConfigValue::String(_) => "string",
            ConfigValue::Sequence(_) => "sequence",
            ConfigValue::Mapping(_) => "mapping",
        }
    }
}

/// Walk a dotted key path through nested mappings, e.g. `lookup(map, &["ports", "rpc"])`.
pub fn lookup<'a>(map: &'a ConfigMap, path: &[&str]) -> Option<&'a ConfigValue> {
    let (first, rest) = path.split_first()?;
    let value = map.get(*first)?;
    if rest.is_empty() {
        return Some(value);
    }
    lookup(value.as_mapping()?, rest)
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Int(value)
    }
}

impl From<ConfigMap> for ConfigValue {
    fn from(value: ConfigMap) -> Self {
        ConfigValue::Mapping(value)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(value: Vec<ConfigValue>) -> Self {
        ConfigValue::Sequence(value)
    }
}

impl From<ConfigValue> for serde_json::Value {
    fn from(value: ConfigValue) -> Self {
        match value {
            ConfigValue::Bool(b) => serde_json::Value::Bool(b),
            ConfigValue::Int(i) => serde_json::Value::from(i),
            ConfigValue::String(s) => serde_json::Value::String(s),
            ConfigValue::Sequence(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            ConfigValue::Mapping(map) => serde_json::Value::Object(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

impl TryFrom<serde_json::Value> for ConfigValue {
    type Error = String;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Null => Err("null is not a supported configuration value".to_string()),
            serde_json::Value::Bool(b) => Ok(ConfigValue::Bool(b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(ConfigValue::Int)
                .ok_or_else(|| format!("unsupported number {}: only integers are allowed", n)),
            serde_json::Value::String(s) => Ok(ConfigValue::String(s)),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(ConfigValue::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(ConfigValue::Sequence),
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| ConfigValue::try_from(v).map(|v| (k, v)))
                .collect::<Result<ConfigMap, _>>()
                .map(ConfigValue::Mapping),
        }
    }
}

/// TOML datetimes become strings in their TOML spelling.
impl TryFrom<toml::Value> for ConfigValue {
    type Error = String;

    fn try_from(value: toml::Value) -> Result<Self, Self::Error> {
        match value {
            toml::Value::Boolean(b) => Ok(ConfigValue::Bool(b)),
            toml::Value::Integer(i) => Ok(ConfigValue::Int(i)),
            toml::Value::Float(f) => Err(format!(
                "unsupported number {}: only integers are allowed",
                f
            )),
            toml::Value::String(s) => Ok(ConfigValue::String(s)),
            toml::Value::Datetime(dt) => Ok(ConfigValue::String(dt.to_string())),
            toml::Value::Array(items) => items
                .into_iter()
                .map(ConfigValue::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(ConfigValue::Sequence),
            toml::Value::Table(table) => table
                .into_iter()
                .map(|(k, v)| ConfigValue::try_from(v).map(|v| (k, v)))
                .collect::<Result<ConfigMap, _>>()
                .map(ConfigValue::Mapping),
        }
    }
}

/// Build a `ConfigMap` from a JSON object literal. Non-objects yield an error.
pub fn map_from_json(value: serde_json::Value) -> Result<ConfigMap, String> {
    match ConfigValue::try_from(value)? {
        ConfigValue::Mapping(map) => Ok(map),
        other => Err(format!("expected a mapping, found {}", other.kind())),
    }
}
