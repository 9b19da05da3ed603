use std::fmt;

use relayer_config::ConfigError;
use thiserror::Error;

/// Step of the per-reference load sequence a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Resolution,
    ContractValidation,
    ConfigResolution,
    Construction,
    /// The load task itself died before reporting.
    Task,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoadStage::Resolution => "resolution",
            LoadStage::ContractValidation => "contract validation",
            LoadStage::ConfigResolution => "config resolution",
            LoadStage::Construction => "construction",
            LoadStage::Task => "task",
        };
        f.write_str(s)
    }
}

/// Why a plugin (and with it the whole load cycle) failed to load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The reference could not be located or loaded.
    #[error("failed to resolve plugin module \"{reference}\": {cause:#}")]
    ModuleResolution {
        reference: String,
        #[source]
        cause: anyhow::Error,
    },

    /// Something was found at the reference, but it is not a usable plugin.
    #[error("module \"{reference}\" does not satisfy the plugin contract: {reason}")]
    InvalidPluginContract { reference: String, reason: String },

    /// Config resolution failed. Displays exactly as the underlying error.
    #[error("{error}")]
    Config {
        reference: String,
        plugin_name: String,
        error: ConfigError,
    },

    /// The plugin's own construction logic failed (or panicked).
    #[error("plugin \"{plugin_name}\" (from \"{reference}\") failed to construct: {cause:#}")]
    PluginConstruction {
        reference: String,
        plugin_name: String,
        #[source]
        cause: anyhow::Error,
    },

    #[error("load task for \"{reference}\" aborted: {reason}")]
    Aborted { reference: String, reason: String },
}

impl LoadError {
    /// The plugin reference being loaded when the failure happened.
    pub fn reference(&self) -> &str {
        match self {
            LoadError::ModuleResolution { reference, .. }
            | LoadError::InvalidPluginContract { reference, .. }
            | LoadError::Config { reference, .. }
            | LoadError::PluginConstruction { reference, .. }
            | LoadError::Aborted { reference, .. } => reference,
        }
    }

    /// Declared plugin name, when the failure happened after it was known.
    pub fn plugin_name(&self) -> Option<&str> {
        match self {
            LoadError::Config { plugin_name, .. } | LoadError::PluginConstruction { plugin_name, .. } => {
                Some(plugin_name)
            }
            _ => None,
        }
    }

    pub fn stage(&self) -> LoadStage {
        match self {
            LoadError::ModuleResolution { .. } => LoadStage::Resolution,
            LoadError::InvalidPluginContract { .. } => LoadStage::ContractValidation,
            LoadError::Config { .. } => LoadStage::ConfigResolution,
            LoadError::PluginConstruction { .. } => LoadStage::Construction,
            LoadError::Aborted { .. } => LoadStage::Task,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display_is_unchanged() {
        let inner = ConfigError::NotFound { plugin_name: "foo".into() };
        let expected = inner.to_string();
        let err = LoadError::Config {
            reference: "./plugins/foo".into(),
            plugin_name: "foo".into(),
            error: inner,
        };
        assert_eq!(err.to_string(), expected);
        assert_eq!(err.reference(), "./plugins/foo");
        assert_eq!(err.plugin_name(), Some("foo"));
        assert_eq!(err.stage(), LoadStage::ConfigResolution);
    }

    #[test]
    fn test_construction_error_names_plugin() {
        let err = LoadError::PluginConstruction {
            reference: "token_bridge".into(),
            plugin_name: "tokenBridge".into(),
            cause: anyhow::anyhow!("rpc unreachable"),
        };
        let msg = err.to_string();
        assert!(msg.contains("tokenBridge"), "{msg}");
        assert!(msg.contains("rpc unreachable"), "{msg}");
        assert_eq!(err.stage().to_string(), "construction");

        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("rpc unreachable"));
    }

    #[test]
    fn test_resolution_error_exposes_cause() {
        let err = LoadError::ModuleResolution {
            reference: "./plugins/ghost".into(),
            cause: anyhow::anyhow!("no module registered"),
        };
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("no module registered"));
    }
}
