//! Plugin loading for the relayer host.
//!
//! A plugin reference is resolved to a [`PluginModule`] through a
//! [`ModuleResolver`], validated into a [`PluginFactory`], configured through
//! the [`relayer_config::ConfigResolver`] and constructed with a logger
//! scoped to the plugin's name. [`PluginLoader::load_all`] does this for
//! every configured reference concurrently, all or nothing.

pub mod error;
pub mod loader;
pub mod module;
pub mod registry;

pub use error::{LoadError, LoadStage};
pub use loader::{LoadedPlugin, PluginLoader};
pub use module::{PluginFactory, PluginModule};
pub use registry::{ModuleResolver, StaticModuleResolver};
