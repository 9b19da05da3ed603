//! Module resolution: turning a plugin reference into a [`PluginModule`].
//!
//! Rust has no runtime `import`, so resolution is a strategy behind
//! [`ModuleResolver`]. [`StaticModuleResolver`] is the compiled-in registry
//! the host binary uses.

use std::collections::HashMap;

use anyhow::{bail, Result};
use async_trait::async_trait;
use relayer_core::PluginConstructor;
use tracing::{debug, info, warn};

use crate::module::PluginModule;

/// Strategy for locating the module behind a plugin reference.
#[async_trait]
pub trait ModuleResolver: Send + Sync {
    /// Locate and load the module at `reference`. Errors mean nothing usable
    /// could be found there; contract checks happen afterwards.
    async fn resolve(&self, reference: &str) -> Result<PluginModule>;
}

/// Registry mapping reference strings to modules linked into the binary.
#[derive(Debug, Clone, Default)]
pub struct StaticModuleResolver {
    modules: HashMap<String, PluginModule>,
}

impl StaticModuleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `module` under `reference`, returning any module it replaced.
    pub fn register(&mut self, reference: impl Into<String>, module: PluginModule) -> Option<PluginModule> {
        let reference = reference.into();
        info!(reference = %reference, plugin = ?module.plugin_name, "Registering plugin module");
        let previous = self.modules.insert(reference.clone(), module);
        if previous.is_some() {
            warn!(reference = %reference, "Replaced previously registered plugin module");
        }
        previous
    }

    /// Shorthand for registering a well-formed module.
    pub fn register_constructor(
        &mut self,
        reference: impl Into<String>,
        plugin_name: impl Into<String>,
        constructor: impl PluginConstructor + 'static,
    ) -> Option<PluginModule> {
        self.register(reference, PluginModule::new(plugin_name, constructor))
    }

    pub fn unregister(&mut self, reference: &str) -> bool {
        self.modules.remove(reference).is_some()
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.modules.contains_key(reference)
    }

    /// Registered references, sorted.
    pub fn references(&self) -> Vec<&str> {
        let mut refs: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        refs.sort_unstable();
        refs
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[async_trait]
impl ModuleResolver for StaticModuleResolver {
    async fn resolve(&self, reference: &str) -> Result<PluginModule> {
        match self.modules.get(reference) {
            Some(module) => {
                debug!(reference = %reference, "Resolved plugin module from registry");
                Ok(module.clone())
            }
            None => bail!(
                "no plugin module registered under \"{}\" (registered: [{}])",
                reference,
                self.references().join(", ")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relayer_core::{constructor_fn, Plugin};

    fn module(name: &str) -> PluginModule {
        PluginModule::new(
            name,
            constructor_fn(|_env, _config, _logger| async move {
                Err::<Box<dyn Plugin>, _>(anyhow::anyhow!("not used"))
            }),
        )
    }

    #[tokio::test]
    async fn test_resolve_registered_reference() {
        let mut registry = StaticModuleResolver::new();
        registry.register("token_bridge", module("tokenBridge"));

        let resolved = registry.resolve("token_bridge").await.unwrap();
        assert_eq!(resolved.plugin_name.as_deref(), Some("tokenBridge"));
    }

    #[tokio::test]
    async fn test_resolve_unknown_reference() {
        let mut registry = StaticModuleResolver::new();
        registry.register("b", module("b"));
        registry.register("a", module("a"));

        let err = registry.resolve("missing").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("\"missing\""), "{msg}");
        assert!(msg.contains("[a, b]"), "{msg}");
    }

    #[test]
    fn test_register_replace_and_unregister() {
        let mut registry = StaticModuleResolver::new();
        assert!(registry.register("x", module("one")).is_none());
        let replaced = registry.register("x", module("two")).unwrap();
        assert_eq!(replaced.plugin_name.as_deref(), Some("one"));
        assert_eq!(registry.len(), 1);
        assert!(registry.unregister("x"));
        assert!(!registry.contains("x"));
        assert!(registry.is_empty());
    }
}
