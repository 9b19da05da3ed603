//! `relayer-config`: configuration for the relayer host and its plugins.
//!
//! Provides:
//! - Per-plugin config resolution (defaults overlaid with an environment override)
//! - File-backed and in-memory config stores
//! - One-level-deep merge of key-value documents
//! - JSON / YAML / TOML document parsing
//! - `CommonEnv` loading with environment-variable overrides

pub mod env;
pub mod error;
pub mod io;
pub mod merge;
pub mod resolver;
pub mod store;

pub use env::{apply_env_overrides, apply_env_overrides_with, validate_common_env};
pub use error::{ConfigError, Result};
pub use io::{load_common_env, parse_document, DocumentFormat};
pub use merge::merge;
pub use resolver::ConfigResolver;
pub use store::{is_valid_plugin_name, ConfigDocument, ConfigStore, FileConfigStore, MemoryConfigStore};
