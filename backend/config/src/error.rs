use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Failures while locating, reading or parsing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No default document exists for the plugin. An override alone is not enough.
    #[error("no default configuration found for plugin \"{plugin_name}\"")]
    NotFound { plugin_name: String },

    /// A document was found but is not a usable key-value mapping.
    #[error("failed to parse config document {location}: {reason}")]
    Parse { location: String, reason: String },

    #[error("failed to read config document {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("plugin name \"{plugin_name}\" cannot be used to locate config documents")]
    InvalidName { plugin_name: String },

    #[error("invalid common env ({location}): {reason}")]
    CommonEnv { location: String, reason: String },
}
