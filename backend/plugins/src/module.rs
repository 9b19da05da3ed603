//! What a plugin reference resolves to, and the contract it must satisfy.

use std::fmt;
use std::sync::Arc;

use relayer_config::is_valid_plugin_name;
use relayer_core::{CommonEnv, Logger, Plugin, PluginConfig, PluginConstructor};

use crate::error::LoadError;

/// Exports of a resolved plugin module.
///
/// Both parts are optional here because a resolver only reports what it
/// found; [`PluginModule::into_factory`] decides whether that is a plugin.
#[derive(Clone, Default)]
pub struct PluginModule {
    /// Identity the module declares. Config is looked up under this name.
    pub plugin_name: Option<String>,
    pub constructor: Option<Arc<dyn PluginConstructor>>,
}

impl PluginModule {
    /// A well-formed module.
    pub fn new(plugin_name: impl Into<String>, constructor: impl PluginConstructor + 'static) -> Self {
        Self {
            plugin_name: Some(plugin_name.into()),
            constructor: Some(Arc::new(constructor)),
        }
    }

    /// Validate the exports into a [`PluginFactory`].
    pub fn into_factory(self, reference: &str) -> Result<PluginFactory, LoadError> {
        let invalid = |reason: String| LoadError::InvalidPluginContract {
            reference: reference.to_string(),
            reason,
        };

        let plugin_name = match self.plugin_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(invalid("missing plugin name".to_string())),
        };
        if !is_valid_plugin_name(&plugin_name) {
            return Err(invalid(format!(
                "plugin name \"{plugin_name}\" may only contain ASCII letters, digits, '_', '-' and '.'"
            )));
        }
        let constructor = self
            .constructor
            .ok_or_else(|| invalid(format!("plugin \"{plugin_name}\" exports no constructor")))?;

        Ok(PluginFactory {
            plugin_name,
            constructor,
        })
    }
}

impl fmt::Debug for PluginModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginModule")
            .field("plugin_name", &self.plugin_name)
            .field("has_constructor", &self.constructor.is_some())
            .finish()
    }
}

/// A validated plugin module: a name plus a construction operation.
///
/// Used once per load, then dropped.
#[derive(Clone)]
pub struct PluginFactory {
    plugin_name: String,
    constructor: Arc<dyn PluginConstructor>,
}

impl PluginFactory {
    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    pub async fn create(
        &self,
        env: Arc<CommonEnv>,
        config: PluginConfig,
        logger: Logger,
    ) -> anyhow::Result<Box<dyn Plugin>> {
        self.constructor.create(env, config, logger).await
    }
}

impl fmt::Debug for PluginFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginFactory")
            .field("plugin_name", &self.plugin_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadStage;
    use relayer_core::constructor_fn;

    fn never() -> impl PluginConstructor + 'static {
        constructor_fn(|_env, _config, _logger| async move {
            Err::<Box<dyn Plugin>, _>(anyhow::anyhow!("not used"))
        })
    }

    #[test]
    fn test_well_formed_module() {
        let factory = PluginModule::new("tokenBridge", never()).into_factory("token_bridge").unwrap();
        assert_eq!(factory.plugin_name(), "tokenBridge");
    }

    #[test]
    fn test_missing_constructor() {
        let module = PluginModule {
            plugin_name: Some("tokenBridge".into()),
            constructor: None,
        };
        let err = module.into_factory("token_bridge").unwrap_err();
        assert_eq!(err.stage(), LoadStage::ContractValidation);
        assert_eq!(err.reference(), "token_bridge");
    }

    #[test]
    fn test_missing_or_blank_name() {
        let blank = PluginModule {
            plugin_name: Some("  ".into()),
            constructor: Some(Arc::new(never())),
        };
        assert!(matches!(
            blank.into_factory("x").unwrap_err(),
            LoadError::InvalidPluginContract { .. }
        ));
        assert!(matches!(
            PluginModule::default().into_factory("x").unwrap_err(),
            LoadError::InvalidPluginContract { .. }
        ));
    }

    #[test]
    fn test_name_unusable_as_identity() {
        let err = PluginModule::new("../token", never()).into_factory("x").unwrap_err();
        assert!(err.to_string().contains("../token"), "{err}");
    }
}
