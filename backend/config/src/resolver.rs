//! Per-plugin configuration resolution.

use std::path::PathBuf;
use std::sync::Arc;

use relayer_core::{EnvType, PluginConfig};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::merge::merge;
use crate::store::{ConfigStore, FileConfigStore};

/// Produces the merged config for a plugin identity in one environment.
#[derive(Clone)]
pub struct ConfigResolver {
    store: Arc<dyn ConfigStore>,
}

impl ConfigResolver {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// Resolver over a [`FileConfigStore`] rooted at `root`.
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileConfigStore::new(root)))
    }

    /// Resolve the config for `plugin_name`.
    ///
    /// Lookup is always by `plugin_name`; `reference` only helps the store
    /// find the documents. A missing default is [`ConfigError::NotFound`]
    /// even when an override exists. A missing override means defaults only.
    pub async fn resolve(&self, plugin_name: &str, reference: &str, env: EnvType) -> Result<PluginConfig> {
        let defaults = self
            .store
            .load_default(plugin_name, reference)
            .await?
            .ok_or_else(|| ConfigError::NotFound {
                plugin_name: plugin_name.to_string(),
            })?;

        let values = match self.store.load_override(plugin_name, env).await? {
            Some(overrides) => {
                debug!(
                    plugin = %plugin_name,
                    env = %env,
                    defaults = %defaults.location,
                    overrides = %overrides.location,
                    "Merging plugin config override"
                );
                merge(defaults.values, overrides.values)
            }
            None => {
                debug!(
                    plugin = %plugin_name,
                    env = %env,
                    defaults = %defaults.location,
                    "No override for plugin config; using defaults"
                );
                defaults.values
            }
        };

        Ok(PluginConfig::new(plugin_name, values))
    }
}

impl std::fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryConfigStore;
    use relayer_core::{ConfigMap, ConfigValue};

    fn map(pairs: &[(&str, ConfigValue)]) -> ConfigMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn resolver(store: MemoryConfigStore) -> ConfigResolver {
        ConfigResolver::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_override_key_wins_others_kept() {
        let store = MemoryConfigStore::new()
            .with_default("tokenBridge", map(&[("rpc", "http://localhost:8545".into()), ("confirmations", 1i64.into())]))
            .with_override("tokenBridge", EnvType::Mainnet, map(&[("rpc", "https://eth.rpc".into()), ("extra", true.into())]));
        let resolver = resolver(store);

        let config = resolver.resolve("tokenBridge", "token_bridge", EnvType::Mainnet).await.unwrap();
        assert_eq!(config.plugin_name(), "tokenBridge");
        assert_eq!(config.get_str("rpc"), Some("https://eth.rpc"));
        assert_eq!(config.get_i64("confirmations"), Some(1));
        assert_eq!(config.get_bool("extra"), Some(true));

        // Same inputs, same output.
        let again = resolver.resolve("tokenBridge", "token_bridge", EnvType::Mainnet).await.unwrap();
        assert_eq!(config, again);
    }

    #[tokio::test]
    async fn test_missing_override_uses_defaults() {
        let defaults = map(&[("rpc", "http://localhost:8545".into())]);
        let store = MemoryConfigStore::new().with_default("tokenBridge", defaults.clone());

        let config = resolver(store).resolve("tokenBridge", "token_bridge", EnvType::Devnet).await.unwrap();
        assert_eq!(config.values(), &defaults);
    }

    #[tokio::test]
    async fn test_override_without_default_is_not_found() {
        let store = MemoryConfigStore::new().with_override("foo", EnvType::Devnet, map(&[("k", 1i64.into())]));

        let err = resolver(store).resolve("foo", "foo", EnvType::Devnet).await.unwrap_err();
        match err {
            ConfigError::NotFound { plugin_name } => assert_eq!(plugin_name, "foo"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_lookup_uses_name_not_reference() {
        let store = MemoryConfigStore::new()
            .with_default("declaredName", map(&[("who", "declared".into())]))
            .with_default("./plugins/some_ref", map(&[("who", "reference".into())]));

        let config = resolver(store)
            .resolve("declaredName", "./plugins/some_ref", EnvType::Devnet)
            .await
            .unwrap();
        assert_eq!(config.get_str("who"), Some("declared"));
    }

    #[tokio::test]
    async fn test_file_backed_parse_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("defaults")).unwrap();
        std::fs::write(dir.path().join("defaults/broken.json"), "{ nope").unwrap();

        let err = ConfigResolver::from_dir(dir.path())
            .resolve("broken", "broken", EnvType::Devnet)
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
    }

    #[tokio::test]
    async fn test_file_backed_merge() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("defaults")).unwrap();
        std::fs::create_dir_all(dir.path().join("testnet/plugins")).unwrap();
        std::fs::write(
            dir.path().join("defaults/dummy.yaml"),
            "greeting: hello\nchain:\n  id: 2\n  finality: 15\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("testnet/plugins/dummy.json"), r#"{"chain": {"id": 10002}}"#).unwrap();

        let config = ConfigResolver::from_dir(dir.path())
            .resolve("dummy", "dummy_plugin", EnvType::Testnet)
            .await
            .unwrap();
        assert_eq!(config.get_str("greeting"), Some("hello"));
        let chain = config.get("chain").and_then(ConfigValue::as_mapping).unwrap();
        assert_eq!(chain["id"], ConfigValue::Integer(10002));
        assert_eq!(chain["finality"], ConfigValue::Integer(15));
    }
}
