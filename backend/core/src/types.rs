use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownEnvType;

/// Deployment environment. Selects which configuration overlay applies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnvType {
    Mainnet,
    Testnet,
    #[default]
    Devnet,
    Tilt,
    Localhost,
}

impl EnvType {
    /// Lowercase tag, also used as the overlay directory name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvType::Mainnet => "mainnet",
            EnvType::Testnet => "testnet",
            EnvType::Devnet => "devnet",
            EnvType::Tilt => "tilt",
            EnvType::Localhost => "localhost",
        }
    }
}

impl fmt::Display for EnvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvType {
    type Err = UnknownEnvType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(EnvType::Mainnet),
            "testnet" => Ok(EnvType::Testnet),
            "devnet" => Ok(EnvType::Devnet),
            "tilt" => Ok(EnvType::Tilt),
            "localhost" => Ok(EnvType::Localhost),
            _ => Err(UnknownEnvType(s.to_string())),
        }
    }
}

/// Process-wide configuration shared by the host and every plugin.
///
/// Loaded once at startup and shared as `Arc<CommonEnv>`; nothing mutates it
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CommonEnv {
    /// Plugin references, in the order they were configured.
    #[serde(alias = "pluginURIs", alias = "pluginUris")]
    pub plugin_uris: Vec<String>,

    #[serde(alias = "envType")]
    pub env_type: EnvType,

    #[serde(default = "default_log_level", alias = "logLevel")]
    pub log_level: String,

    /// Directory for the rolling NDJSON log; console only when unset.
    #[serde(default, alias = "logDir", skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl CommonEnv {
    pub fn new(plugin_uris: Vec<String>, env_type: EnvType) -> Self {
        Self {
            plugin_uris,
            env_type,
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}
