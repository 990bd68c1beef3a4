use std::collections::BTreeMap;

use crate::resolver::ResolvedIds;

/// canister name → network name → identifier.
///
/// Built once per run and serialized pretty-printed to `canister_ids.json`.
/// `BTreeMap` keeps the serialized form byte-stable across runs.
pub type CanisterConfig = BTreeMap<String, BTreeMap<String, String>>;

/// Build the config map for the active network. A canister with no resolved
/// identifier still gets an entry with an empty string, matching what the
/// generated scripts embed.
pub fn canister_config(network: &str, ids: &ResolvedIds) -> CanisterConfig {
    let mut map = CanisterConfig::new();
    insert(&mut map, network, "admin", ids.admin.as_deref());
    insert(&mut map, network, "assets_management", ids.assets_management.as_deref());
    insert(&mut map, network, "staking", ids.staking.as_deref());
    map
}

pub fn to_json(config: &CanisterConfig) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(config)?)
}

/// Identifier for `name` on `network`, empty when unresolved.
pub fn id_for<'a>(config: &'a CanisterConfig, name: &str, network: &str) -> &'a str {
    config
        .get(name)
        .and_then(|by_net| by_net.get(network))
        .map(String::as_str)
        .unwrap_or("")
}

fn insert(map: &mut CanisterConfig, network: &str, name: &str, id: Option<&str>) {
    if id.is_none() {
        tracing::warn!(canister = name, "no identifier resolved, scripts will embed an empty value");
    }
    map.entry(name.to_string())
        .or_default()
        .insert(network.to_string(), id.unwrap_or("").to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> ResolvedIds {
        ResolvedIds {
            admin: Some("aaa".to_string()),
            staking: Some("sss".to_string()),
            assets_management: None,
        }
    }

    #[test]
    fn builds_entry_per_canister() {
        let cfg = canister_config("local", &ids());
        assert_eq!(cfg.len(), 3);
        assert_eq!(id_for(&cfg, "staking", "local"), "sss");
        assert_eq!(id_for(&cfg, "assets_management", "local"), "");
        assert_eq!(id_for(&cfg, "staking", "ic"), "");
    }

    #[test]
    fn json_round_trips() {
        let cfg = canister_config("ic", &ids());
        let text = to_json(&cfg).unwrap();
        let back: CanisterConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn json_is_stable() {
        let a = to_json(&canister_config("local", &ids())).unwrap();
        let b = to_json(&canister_config("local", &ids())).unwrap();
        assert_eq!(a, b);
    }
}
