use anyhow::{Context as _, Result};
use serde::Deserialize;
use std::path::Path;

/// Generator settings from an optional `rigging.toml`.
///
/// Every field has a default that reproduces the stock tool, so running
/// without a config file is the normal case.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dfx: DfxConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let cfg: Self = toml::from_str(&text)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;
        Ok(cfg)
    }

    /// Load from `path` if given, otherwise defaults.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Ok(Self::default()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DfxConfig {
    /// Binary used for `canister id` lookups in dfx mode.
    #[serde(default = "default_dfx_bin")]
    pub bin: String,

    /// Hard deadline for a single lookup.
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_secs: u64,
}

impl Default for DfxConfig {
    fn default() -> Self {
        Self {
            bin: default_dfx_bin(),
            lookup_timeout_secs: default_lookup_timeout(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    /// Directory the JSON and scripts are written to. `--out-dir` wins.
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_dfx_bin() -> String {
    "dfx".to_string()
}

fn default_lookup_timeout() -> u64 {
    10
}
