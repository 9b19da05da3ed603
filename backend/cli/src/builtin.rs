//! Plugins linked into the host binary.

use std::any::Any;
use std::sync::Arc;

use anyhow::{Context, Result};
use relayer_core::{constructor_fn, CommonEnv, EnvType, Logger, Plugin, PluginConfig};
use relayer_plugins::StaticModuleResolver;
use serde::Deserialize;

pub const DUMMY_REFERENCE: &str = "dummy_plugin";
pub const DUMMY_NAME: &str = "dummy";

#[derive(Debug, Deserialize)]
struct DummySettings {
    #[serde(default = "default_greeting")]
    greeting: String,
    #[serde(default)]
    chains: Vec<u16>,
}

fn default_greeting() -> String {
    "hello".to_string()
}

/// Does nothing beyond announcing itself. Useful for checking a deployment's
/// config layout end to end.
pub struct DummyPlugin {
    settings: DummySettings,
    env_type: EnvType,
    logger: Logger,
}

impl DummyPlugin {
    async fn create(env: Arc<CommonEnv>, config: PluginConfig, logger: Logger) -> Result<Box<dyn Plugin>> {
        let settings: DummySettings = config
            .deserialize()
            .context("invalid dummy plugin config")?;
        logger.info(format!(
            "{} from {} (watching {} chains)",
            settings.greeting,
            env.env_type,
            settings.chains.len()
        ));
        Ok(Box::new(DummyPlugin {
            settings,
            env_type: env.env_type,
            logger,
        }))
    }
}

impl Plugin for DummyPlugin {
    fn name(&self) -> &str {
        DUMMY_NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for DummyPlugin {
    fn drop(&mut self) {
        self.logger.debug(format!("released ({})", self.env_type));
    }
}

/// Registry of every built-in module, keyed by reference.
pub fn registry() -> StaticModuleResolver {
    let mut registry = StaticModuleResolver::new();
    registry.register_constructor(DUMMY_REFERENCE, DUMMY_NAME, constructor_fn(DummyPlugin::create));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use relayer_config::ConfigResolver;
    use relayer_plugins::PluginLoader;

    fn shipped_config() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config")
    }

    async fn load(env_type: EnvType) -> DummySnapshot {
        let loader = PluginLoader::new(
            Arc::new(registry()),
            ConfigResolver::from_dir(shipped_config()),
            Logger::base(),
        );
        let env = Arc::new(CommonEnv::new(vec![DUMMY_REFERENCE.to_string()], env_type));
        let loaded = loader.load_all(env).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].plugin_name, DUMMY_NAME);

        let dummy = loaded[0].plugin.as_any().downcast_ref::<DummyPlugin>().unwrap();
        DummySnapshot {
            greeting: dummy.settings.greeting.clone(),
            chains: dummy.settings.chains.clone(),
            labels: dummy.logger.labels().to_vec(),
        }
    }

    struct DummySnapshot {
        greeting: String,
        chains: Vec<u16>,
        labels: Vec<String>,
    }

    #[tokio::test]
    async fn test_shipped_devnet_config() {
        let dummy = load(EnvType::Devnet).await;
        assert_eq!(dummy.greeting, "gm devnet");
        assert_eq!(dummy.chains, vec![2, 4]);
        assert_eq!(dummy.labels, vec![DUMMY_NAME.to_string()]);
    }

    #[tokio::test]
    async fn test_shipped_mainnet_config() {
        let dummy = load(EnvType::Mainnet).await;
        assert_eq!(dummy.greeting, "gm");
        assert_eq!(dummy.chains, vec![1, 2, 4]);
    }

    #[tokio::test]
    async fn test_env_without_override_uses_defaults() {
        let dummy = load(EnvType::Tilt).await;
        assert_eq!(dummy.greeting, "hello");
    }
}
