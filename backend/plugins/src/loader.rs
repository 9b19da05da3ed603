//! Plugin Loader
//!
//! For every configured reference: resolve the module, validate it, resolve
//! its config under the name it declares, scope a logger to that name and
//! run its constructor. All references load concurrently; the first failure
//! fails the whole cycle.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use relayer_config::ConfigResolver;
use relayer_core::{scope, CommonEnv, Logger, Plugin};
use tokio::task::{self, JoinError, JoinSet};
use tracing::{debug, error, warn};

use crate::error::LoadError;
use crate::registry::ModuleResolver;

/// A constructed plugin together with where it came from.
pub struct LoadedPlugin {
    pub reference: String,
    pub plugin_name: String,
    pub plugin: Box<dyn Plugin>,
}

impl fmt::Debug for LoadedPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedPlugin")
            .field("reference", &self.reference)
            .field("plugin_name", &self.plugin_name)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct PluginLoader {
    resolver: Arc<dyn ModuleResolver>,
    config: ConfigResolver,
    logger: Logger,
}

impl PluginLoader {
    /// `logger` is the process base logger; each plugin gets a child of it.
    pub fn new(resolver: Arc<dyn ModuleResolver>, config: ConfigResolver, logger: Logger) -> Self {
        Self {
            resolver,
            config,
            logger,
        }
    }

    /// Load every plugin listed in `env`.
    ///
    /// Results come back in the order of `env.plugin_uris`. On the first
    /// failure the cycle is aborted: loads still in flight keep running to
    /// completion in the background but their results are discarded.
    pub async fn load_all(&self, env: Arc<CommonEnv>) -> Result<Vec<LoadedPlugin>, LoadError> {
        let total = env.plugin_uris.len();
        self.logger.info(format!("Loading {total} plugins..."));

        let mut join_set = JoinSet::new();
        let mut task_refs = HashMap::with_capacity(total);
        for (idx, reference) in env.plugin_uris.iter().cloned().enumerate() {
            let loader = self.clone();
            let env = Arc::clone(&env);
            let task_ref = reference.clone();
            let handle = join_set.spawn(async move {
                let outcome = AssertUnwindSafe(loader.load_one(&reference, env))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| {
                        Err(LoadError::Aborted {
                            reference: reference.clone(),
                            reason: format!("panicked: {}", panic_message(&*panic)),
                        })
                    });
                (idx, outcome)
            });
            task_refs.insert(handle.id(), task_ref);
        }

        let mut slots: Vec<Option<LoadedPlugin>> = (0..total).map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            let err = match joined {
                Ok((idx, Ok(loaded))) => {
                    slots[idx] = Some(loaded);
                    continue;
                }
                Ok((_, Err(e))) => e,
                Err(e) => task_failure(&task_refs, e),
            };

            error!(
                reference = %err.reference(),
                stage = %err.stage(),
                error = %err,
                "Plugin failed to load; aborting load cycle"
            );
            // Let in-flight siblings finish on their own rather than cancelling them.
            join_set.detach_all();
            return Err(err);
        }

        let plugins: Vec<LoadedPlugin> = slots.into_iter().flatten().collect();
        self.logger.info(format!("Loaded {} plugins", plugins.len()));
        Ok(plugins)
    }

    /// Load a single plugin reference.
    pub async fn load_one(&self, reference: &str, env: Arc<CommonEnv>) -> Result<LoadedPlugin, LoadError> {
        debug!(reference = %reference, "Resolving plugin module");
        let module = self
            .resolver
            .resolve(reference)
            .await
            .map_err(|cause| LoadError::ModuleResolution {
                reference: reference.to_string(),
                cause,
            })?;

        let factory = module.into_factory(reference)?;
        let plugin_name = factory.plugin_name().to_string();

        let config = self
            .config
            .resolve(&plugin_name, reference, env.env_type)
            .await
            .map_err(|error| LoadError::Config {
                reference: reference.to_string(),
                plugin_name: plugin_name.clone(),
                error,
            })?;

        let logger = scope(&self.logger, &[plugin_name.as_str()]);

        debug!(reference = %reference, plugin = %plugin_name, "Constructing plugin");
        let plugin = AssertUnwindSafe(factory.create(env, config, logger))
            .catch_unwind()
            .await
            .map_err(|panic| anyhow::anyhow!("constructor panicked: {}", panic_message(&*panic)))
            .and_then(|created| created)
            .map_err(|cause| LoadError::PluginConstruction {
                reference: reference.to_string(),
                plugin_name: plugin_name.clone(),
                cause,
            })?;

        if plugin.name() != plugin_name {
            warn!(
                reference = %reference,
                declared = %plugin_name,
                reported = %plugin.name(),
                "Constructed plugin reports a different name than its module declared"
            );
        }
        self.logger.debug(format!("Loaded plugin {plugin_name} from {reference}"));

        Ok(LoadedPlugin {
            reference: reference.to_string(),
            plugin_name,
            plugin,
        })
    }
}

/// A load task that died without reporting, attributed to its reference.
fn task_failure(task_refs: &HashMap<task::Id, String>, err: JoinError) -> LoadError {
    let reference = task_refs
        .get(&err.id())
        .cloned()
        .unwrap_or_else(|| format!("<task {}>", err.id()));
    LoadError::Aborted {
        reference,
        reason: err.to_string(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
