//! Config document I/O.
//!
//! Documents are JSON, YAML or TOML, picked by file extension. Every
//! document must be a key-value mapping at the top level.

use std::path::{Path, PathBuf};

use relayer_core::{CommonEnv, ConfigMap, ConfigValue};
use tokio::fs;
use tracing::{debug, info};

use crate::env::{apply_env_overrides, validate_common_env};
use crate::error::{ConfigError, Result};

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// Extensions probed when looking a document up by stem, in priority order.
    pub const EXTENSIONS: [&'static str; 4] = ["yaml", "yml", "json", "toml"];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(DocumentFormat::Json),
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            "toml" => Some(DocumentFormat::Toml),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Parse a document into a key-value mapping.
///
/// A blank document (or a YAML document holding only comments) is an empty
/// mapping. Anything else that is not a mapping is rejected.
pub fn parse_document(content: &str, format: DocumentFormat, location: &str) -> Result<ConfigMap> {
    if is_blank(content, format) {
        return Ok(ConfigMap::new());
    }

    let parse_err = |reason: String| ConfigError::Parse {
        location: location.to_string(),
        reason,
    };

    let value: ConfigValue = match format {
        DocumentFormat::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string()))?,
        DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(|e| parse_err(e.to_string()))?,
        DocumentFormat::Toml => {
            let value = toml::from_str(content).map_err(|e| parse_err(e.to_string()))?;
            datetimes_to_strings(value)
        }
    };

    match value {
        ConfigValue::Mapping(map) => Ok(map),
        ConfigValue::Null => Ok(ConfigMap::new()),
        other => Err(parse_err(format!(
            "expected a key-value mapping at the top level, found {}",
            kind_of(&other)
        ))),
    }
}

/// Key under which `toml` surfaces a datetime when deserializing into a
/// self-describing type.
const TOML_DATETIME_KEY: &str = "$__toml_private_datetime";

/// Replace TOML datetimes with their RFC 3339 text.
fn datetimes_to_strings(value: ConfigValue) -> ConfigValue {
    match value {
        ConfigValue::Mapping(mut map) => {
            if map.len() == 1 && matches!(map.get(TOML_DATETIME_KEY), Some(ConfigValue::String(_))) {
                return map.remove(TOML_DATETIME_KEY).unwrap_or_default();
            }
            ConfigValue::Mapping(map.into_iter().map(|(k, v)| (k, datetimes_to_strings(v))).collect())
        }
        ConfigValue::Sequence(items) => ConfigValue::Sequence(items.into_iter().map(datetimes_to_strings).collect()),
        other => other,
    }
}

fn is_blank(content: &str, format: DocumentFormat) -> bool {
    match format {
        DocumentFormat::Json => content.trim().is_empty(),
        DocumentFormat::Yaml | DocumentFormat::Toml => content.lines().all(|line| {
            let line = line.trim();
            line.is_empty() || line.starts_with('#') || line == "---"
        }),
    }
}

fn kind_of(value: &ConfigValue) -> &'static str {
    match value {
        ConfigValue::Null => "null",
        ConfigValue::Bool(_) => "a boolean",
        ConfigValue::Integer(_) | ConfigValue::Unsigned(_) | ConfigValue::Float(_) => "a number",
        ConfigValue::String(_) => "a string",
        ConfigValue::Sequence(_) => "a sequence",
        ConfigValue::Mapping(_) => "a mapping",
    }
}

/// Read and parse the document at `path`.
///
/// Returns `Ok(None)` when the file does not exist.
pub async fn read_document(path: &Path) -> Result<Option<ConfigMap>> {
    let location = path.display().to_string();
    let format = DocumentFormat::from_path(path).ok_or_else(|| ConfigError::Parse {
        location: location.clone(),
        reason: "unsupported document extension".to_string(),
    })?;

    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(ConfigError::Io { location, source }),
    };

    parse_document(&raw, format, &location).map(Some)
}

/// Look up `<stem>.<ext>` for each supported extension; the first hit wins.
pub async fn find_document(stem: &Path) -> Result<Option<(PathBuf, ConfigMap)>> {
    for ext in DocumentFormat::EXTENSIONS {
        let mut candidate = stem.as_os_str().to_owned();
        candidate.push(".");
        candidate.push(ext);
        let candidate = PathBuf::from(candidate);

        if let Some(values) = read_document(&candidate).await? {
            debug!(path = %candidate.display(), "Found config document");
            return Ok(Some((candidate, values)));
        }
    }
    Ok(None)
}

/// Load the host's `CommonEnv` from disk.
///
/// `RELAYER_*` environment variables override the file, then the result is
/// validated.
pub async fn load_common_env(path: &Path) -> Result<CommonEnv> {
    let location = path.display().to_string();
    let raw = fs::read_to_string(path).await.map_err(|source| ConfigError::Io {
        location: location.clone(),
        source,
    })?;

    let parse_err = |reason: String| ConfigError::Parse {
        location: location.clone(),
        reason,
    };

    let env: CommonEnv = match DocumentFormat::from_path(path) {
        Some(DocumentFormat::Json) => serde_json::from_str(&raw).map_err(|e| parse_err(e.to_string()))?,
        Some(DocumentFormat::Yaml) => serde_yaml::from_str(&raw).map_err(|e| parse_err(e.to_string()))?,
        Some(DocumentFormat::Toml) => toml::from_str(&raw).map_err(|e| parse_err(e.to_string()))?,
        None => return Err(parse_err("unsupported document extension".to_string())),
    };

    let env = apply_env_overrides(env)?;
    validate_common_env(&env, &location)?;

    info!(
        path = %location,
        env_type = %env.env_type,
        plugins = env.plugin_uris.len(),
        "Loaded common env"
    );
    Ok(env)
}
