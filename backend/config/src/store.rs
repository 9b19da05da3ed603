//! Where plugin config documents live.
//!
//! A [`ConfigStore`] hands out the default document for a plugin identity
//! and, optionally, the override document for one environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use relayer_core::{ConfigMap, EnvType};
use tracing::trace;

use crate::error::{ConfigError, Result};
use crate::io::find_document;

/// A located and parsed config document.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    /// Human-readable origin, used in logs.
    pub location: String,
    pub values: ConfigMap,
}

/// Source of plugin config documents.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Default document for `plugin_name`. `reference` is the locator the
    /// plugin module was loaded from and may be used as a search hint.
    async fn load_default(&self, plugin_name: &str, reference: &str) -> Result<Option<ConfigDocument>>;

    /// Override document for `plugin_name` in `env`.
    async fn load_override(&self, plugin_name: &str, env: EnvType) -> Result<Option<ConfigDocument>>;
}

/// Whether `name` can serve as a plugin identity and storage key.
///
/// Allowed: ASCII letters, digits, `_`, `-` and `.`, not starting with `.`.
pub fn is_valid_plugin_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn check_name(plugin_name: &str) -> Result<()> {
    if is_valid_plugin_name(plugin_name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidName {
            plugin_name: plugin_name.to_string(),
        })
    }
}

/// Config documents on disk.
///
/// ```text
/// <root>/<reference>/config/default.<ext>     when the reference is a path
/// <root>/defaults/<plugin_name>.<ext>
/// <root>/<env>/plugins/<plugin_name>.<ext>    override
/// ```
///
/// `<ext>` is probed as `yaml`, `yml`, `json`, `toml`.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    root: PathBuf,
}

impl FileConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Config dir shipped inside a plugin package, for path-like references.
    fn package_config_dir(&self, reference: &str) -> Option<PathBuf> {
        let path = Path::new(reference);
        let path_like = reference.starts_with("./") || reference.starts_with("../") || path.is_absolute();
        path_like.then(|| self.root.join(path).join("config"))
    }

    /// Candidate stems for the default document, most specific first.
    pub fn default_stems(&self, plugin_name: &str, reference: &str) -> Vec<PathBuf> {
        let mut stems = Vec::with_capacity(2);
        if let Some(dir) = self.package_config_dir(reference) {
            stems.push(dir.join("default"));
        }
        stems.push(self.root.join("defaults").join(plugin_name));
        stems
    }

    pub fn override_stem(&self, plugin_name: &str, env: EnvType) -> PathBuf {
        self.root.join(env.as_str()).join("plugins").join(plugin_name)
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load_default(&self, plugin_name: &str, reference: &str) -> Result<Option<ConfigDocument>> {
        check_name(plugin_name)?;
        for stem in self.default_stems(plugin_name, reference) {
            trace!(stem = %stem.display(), "Probing default config");
            if let Some((path, values)) = find_document(&stem).await? {
                return Ok(Some(ConfigDocument {
                    location: path.display().to_string(),
                    values,
                }));
            }
        }
        Ok(None)
    }

    async fn load_override(&self, plugin_name: &str, env: EnvType) -> Result<Option<ConfigDocument>> {
        check_name(plugin_name)?;
        let stem = self.override_stem(plugin_name, env);
        Ok(find_document(&stem).await?.map(|(path, values)| ConfigDocument {
            location: path.display().to_string(),
            values,
        }))
    }
}

/// In-memory documents, for embedding hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    defaults: HashMap<String, ConfigMap>,
    overrides: HashMap<(String, EnvType), ConfigMap>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, plugin_name: impl Into<String>, values: ConfigMap) -> Self {
        self.insert_default(plugin_name, values);
        self
    }

    pub fn with_override(mut self, plugin_name: impl Into<String>, env: EnvType, values: ConfigMap) -> Self {
        self.insert_override(plugin_name, env, values);
        self
    }

    pub fn insert_default(&mut self, plugin_name: impl Into<String>, values: ConfigMap) {
        self.defaults.insert(plugin_name.into(), values);
    }

    pub fn insert_override(&mut self, plugin_name: impl Into<String>, env: EnvType, values: ConfigMap) {
        self.overrides.insert((plugin_name.into(), env), values);
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn load_default(&self, plugin_name: &str, _reference: &str) -> Result<Option<ConfigDocument>> {
        Ok(self.defaults.get(plugin_name).map(|values| ConfigDocument {
            location: format!("memory:defaults/{plugin_name}"),
            values: values.clone(),
        }))
    }

    async fn load_override(&self, plugin_name: &str, env: EnvType) -> Result<Option<ConfigDocument>> {
        Ok(self
            .overrides
            .get(&(plugin_name.to_string(), env))
            .map(|values| ConfigDocument {
                location: format!("memory:{env}/{plugin_name}"),
                values: values.clone(),
            }))
    }
}
