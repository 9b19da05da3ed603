//! Environment-variable overrides and validation for `CommonEnv`.
//!
//! - `RELAYER_ENV` replaces the environment tag.
//! - `RELAYER_PLUGIN_URIS` replaces the plugin list (comma-separated).
//! - `RELAYER_LOG_LEVEL` replaces the log level.

use std::collections::{HashMap, HashSet};

use relayer_core::{CommonEnv, EnvType};
use tracing::{debug, warn};

use crate::error::{ConfigError, Result};

pub const ENV_TYPE_VAR: &str = "RELAYER_ENV";
pub const PLUGIN_URIS_VAR: &str = "RELAYER_PLUGIN_URIS";
pub const LOG_LEVEL_VAR: &str = "RELAYER_LOG_LEVEL";

/// Apply overrides from the process environment.
///
/// Only the `RELAYER_*` variables are read; a variable that is not valid
/// UTF-8 is treated as unset.
pub fn apply_env_overrides(env: CommonEnv) -> Result<CommonEnv> {
    apply_env_overrides_with(env, &relayer_vars(|name| std::env::var(name).ok()))
}

fn relayer_vars(lookup: impl Fn(&str) -> Option<String>) -> HashMap<String, String> {
    [ENV_TYPE_VAR, PLUGIN_URIS_VAR, LOG_LEVEL_VAR]
        .into_iter()
        .filter_map(|name| lookup(name).map(|value| (name.to_string(), value)))
        .collect()
}

/// Apply overrides from a provided map (useful for testing).
///
/// Empty variables are ignored.
pub fn apply_env_overrides_with(
    mut env: CommonEnv,
    vars: &HashMap<String, String>,
) -> Result<CommonEnv> {
    let get = |name: &str| vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(tag) = get(ENV_TYPE_VAR) {
        env.env_type = tag.parse::<EnvType>().map_err(|e| ConfigError::CommonEnv {
            location: format!("${ENV_TYPE_VAR}"),
            reason: e.to_string(),
        })?;
        debug!(env_type = %env.env_type, "Environment tag overridden");
    }

    if let Some(list) = get(PLUGIN_URIS_VAR) {
        env.plugin_uris = list
            .split(',')
            .map(|uri| uri.trim().to_string())
            .filter(|uri| !uri.is_empty())
            .collect();
        debug!(count = env.plugin_uris.len(), "Plugin list overridden");
    }

    if let Some(level) = get(LOG_LEVEL_VAR) {
        env.log_level = level.to_string();
    }

    Ok(env)
}

/// Reject references the loader could never resolve.
///
/// Duplicate references are allowed: each one is loaded independently.
pub fn validate_common_env(env: &CommonEnv, location: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for (idx, uri) in env.plugin_uris.iter().enumerate() {
        if uri.trim().is_empty() {
            return Err(ConfigError::CommonEnv {
                location: location.to_string(),
                reason: format!("plugin reference #{idx} is blank"),
            });
        }
        if !seen.insert(uri.as_str()) {
            warn!(reference = %uri, "Plugin reference listed more than once; it will be loaded once per entry");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn base() -> CommonEnv {
        CommonEnv::new(vec!["dummy_plugin".into()], EnvType::Devnet)
    }

    #[test]
    fn test_no_overrides_is_identity() {
        let env = apply_env_overrides_with(base(), &HashMap::new()).unwrap();
        assert_eq!(env, base());
    }

    #[test]
    fn test_overrides_replace_fields() {
        let env = apply_env_overrides_with(
            base(),
            &vars(&[
                (ENV_TYPE_VAR, "Mainnet"),
                (PLUGIN_URIS_VAR, "token_bridge, ./plugins/attester ,"),
                (LOG_LEVEL_VAR, "warn"),
            ]),
        )
        .unwrap();

        assert_eq!(env.env_type, EnvType::Mainnet);
        assert_eq!(env.plugin_uris, vec!["token_bridge".to_string(), "./plugins/attester".to_string()]);
        assert_eq!(env.log_level, "warn");
    }

    #[test]
    fn test_empty_override_ignored() {
        let env = apply_env_overrides_with(base(), &vars(&[(ENV_TYPE_VAR, "  ")])).unwrap();
        assert_eq!(env.env_type, EnvType::Devnet);
    }

    #[test]
    fn test_unknown_env_tag_rejected() {
        let err = apply_env_overrides_with(base(), &vars(&[(ENV_TYPE_VAR, "staging")])).unwrap_err();
        assert!(err.to_string().contains("staging"), "{err}");
    }

    #[test]
    fn test_only_relayer_vars_are_collected() {
        let collected = relayer_vars(|name| match name {
            LOG_LEVEL_VAR => Some("trace".to_string()),
            _ => None,
        });
        assert_eq!(collected, vars(&[(LOG_LEVEL_VAR, "trace")]));

        let everything = relayer_vars(|_| Some("x".to_string()));
        assert_eq!(everything.len(), 3);
    }

    #[test]
    fn test_duplicates_are_allowed() {
        let env = CommonEnv::new(vec!["a".into(), "a".into()], EnvType::Devnet);
        assert!(validate_common_env(&env, "common.yaml").is_ok());
    }
}
