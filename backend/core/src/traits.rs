use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use relayer_logging::Logger;

use crate::types::CommonEnv;
use crate::value::PluginConfig;

/// A constructed, running plugin.
///
/// The host only owns plugins; what they do once built is their own business.
pub trait Plugin: Send + Sync {
    /// Name the plugin was registered under.
    fn name(&self) -> &str;

    /// Access to the concrete type, for hosts that know what they loaded.
    fn as_any(&self) -> &dyn Any;
}

/// Construction operation exported by a plugin module.
#[async_trait]
pub trait PluginConstructor: Send + Sync {
    /// Build the plugin from the shared environment, its resolved config and
    /// a logger already scoped to the plugin's name.
    async fn create(
        &self,
        env: Arc<CommonEnv>,
        config: PluginConfig,
        logger: Logger,
    ) -> Result<Box<dyn Plugin>>;
}

/// Adapter turning an async closure into a [`PluginConstructor`].
pub struct FnConstructor<F>(F);

/// Wrap an async closure as a [`PluginConstructor`].
///
/// ```ignore
/// let ctor = constructor_fn(|env, config, logger| async move {
///     Ok(Box::new(MyPlugin::new(env, config, logger)?) as Box<dyn Plugin>)
/// });
/// ```
pub fn constructor_fn<F, Fut>(f: F) -> FnConstructor<F>
where
    F: Fn(Arc<CommonEnv>, PluginConfig, Logger) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Box<dyn Plugin>>> + Send + 'static,
{
    FnConstructor(f)
}

#[async_trait]
impl<F, Fut> PluginConstructor for FnConstructor<F>
where
    F: Fn(Arc<CommonEnv>, PluginConfig, Logger) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Box<dyn Plugin>>> + Send + 'static,
{
    async fn create(
        &self,
        env: Arc<CommonEnv>,
        config: PluginConfig,
        logger: Logger,
    ) -> Result<Box<dyn Plugin>> {
        (self.0)(env, config, logger).await
    }
}
