//! Override-over-default merge for plugin config documents.

use relayer_core::{ConfigMap, ConfigValue};

/// Overlay `overrides` on `defaults`.
///
/// Override keys win; keys only in `defaults` survive untouched; keys only
/// in `overrides` are added. When both sides hold a mapping under the same
/// key the two mappings merge key by key, one level deep. Anything nested
/// deeper than that is replaced wholesale by the override's value.
pub fn merge(defaults: ConfigMap, overrides: ConfigMap) -> ConfigMap {
    let mut merged = defaults;
    for (key, value) in overrides {
        match value {
            ConfigValue::Mapping(nested) => match merged.get_mut(&key) {
                Some(ConfigValue::Mapping(base)) => base.extend(nested),
                _ => {
                    merged.insert(key, ConfigValue::Mapping(nested));
                }
            },
            value => {
                merged.insert(key, value);
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: Vec<(&str, ConfigValue)>) -> ConfigMap {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_override_wins_and_defaults_survive() {
        let defaults = map(vec![("rpc", "http://localhost:8545".into()), ("confirmations", 1i64.into())]);
        let overrides = map(vec![("rpc", "https://rpc.mainnet".into()), ("dry_run", true.into())]);

        let merged = merge(defaults, overrides);
        assert_eq!(merged["rpc"], ConfigValue::from("https://rpc.mainnet"));
        assert_eq!(merged["confirmations"], ConfigValue::Integer(1));
        assert_eq!(merged["dry_run"], ConfigValue::Bool(true));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_nested_mappings_merge_one_level() {
        let defaults = map(vec![(
            "chain",
            map(vec![
                ("id", 2i64.into()),
                ("gas", map(vec![("limit", 100i64.into()), ("price", 5i64.into())]).into()),
            ])
            .into(),
        )]);
        let overrides = map(vec![(
            "chain",
            map(vec![("gas", map(vec![("limit", 900i64.into())]).into())]).into(),
        )]);

        let merged = merge(defaults, overrides);
        let chain = merged["chain"].as_mapping().unwrap();
        // First level merged key by key.
        assert_eq!(chain["id"], ConfigValue::Integer(2));
        // Second level replaced wholesale.
        let gas = chain["gas"].as_mapping().unwrap();
        assert_eq!(gas["limit"], ConfigValue::Integer(900));
        assert!(!gas.contains_key("price"));
    }

    #[test]
    fn test_type_change_replaces_value() {
        let defaults = map(vec![("chain", map(vec![("id", 2i64.into())]).into())]);
        let overrides = map(vec![("chain", "solana".into())]);
        assert_eq!(merge(defaults, overrides)["chain"], ConfigValue::from("solana"));
    }

    #[test]
    fn test_empty_override_is_identity() {
        let defaults = map(vec![("a", 1i64.into())]);
        assert_eq!(merge(defaults.clone(), ConfigMap::new()), defaults);
    }
}
