//! Untyped plugin configuration values.
//!
//! Configuration documents (JSON, YAML or TOML) deserialize straight into
//! [`ConfigValue`], which keeps merging independent of the document format.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Key-value mapping at the top level of every configuration document.
pub type ConfigMap = BTreeMap<String, ConfigValue>;

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum ConfigValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    /// Integers above `i64::MAX`, such as fee or amount ceilings.
    Unsigned(u64),
    Float(f64),
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

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ConfigValue::Unsigned(u) => Some(*u),
            ConfigValue::Integer(i) => u64::try_from(*i).ok(),
            _ => None,
        }
    }

    /// Integers widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),
            ConfigValue::Integer(i) => Some(*i as f64),
            ConfigValue::Unsigned(u) => Some(*u as f64),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&ConfigMap> {
        match self {
            ConfigValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}

impl From<u64> for ConfigValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => ConfigValue::Integer(i),
            Err(_) => ConfigValue::Unsigned(value),
        }
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
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

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(value: Vec<ConfigValue>) -> Self {
        ConfigValue::Sequence(value)
    }
}

impl From<ConfigMap> for ConfigValue {
    fn from(value: ConfigMap) -> Self {
        ConfigValue::Mapping(value)
    }
}

/// Fully resolved configuration for one plugin.
///
/// `plugin_name` is the identity the values were resolved for, which is
/// always the name the plugin module declares.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginConfig {
    plugin_name: String,
    values: ConfigMap,
}

impl PluginConfig {
    pub fn new(plugin_name: impl Into<String>, values: ConfigMap) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            values,
        }
    }

    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigValue::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ConfigValue::as_bool)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ConfigValue::as_i64)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(ConfigValue::as_u64)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ConfigValue::as_f64)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigValue)> {
        self.values.iter()
    }

    pub fn values(&self) -> &ConfigMap {
        &self.values
    }

    pub fn into_values(self) -> ConfigMap {
        self.values
    }

    /// Map the values onto a typed settings struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let value = serde_json::to_value(&self.values)?;
        serde_json::from_value(value)
    }
}
