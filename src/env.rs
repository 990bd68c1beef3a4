use anyhow::{bail, Context as _, Result};
use std::{collections::BTreeMap, fs, path::Path};

pub const KEY_NETWORK: &str = "DFX_NETWORK";
pub const KEY_ADMIN: &str = "CANISTER_ID_ADMIN";
pub const KEY_STAKING: &str = "CANISTER_ID_STAKING";
pub const KEY_ASSETS_MANAGEMENT: &str = "CANISTER_ID_ASSETS_MANAGEMENT";

/// Environment the generator runs against, read once at startup.
///
/// Explicit named fields per canister instead of dynamic key indexing, so a
/// typo in a key name is a compile error rather than an empty script value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployEnv {
    pub network: String,
    pub admin: Option<String>,
    pub staking: Option<String>,
    pub assets_management: Option<String>,
}

impl DeployEnv {
    /// Snapshot the process environment, fill missing keys from the
    /// `.env`-style file at `env_file` (process env wins), and read the
    /// fixed key set.
    ///
    /// `DFX_NETWORK` is required; per-canister identifiers are not — a
    /// missing identifier surfaces later as a warning, matching the
    /// original tool which embedded whatever the environment held.
    pub fn load(env_file: &Path) -> Result<Self> {
        let mut vars: BTreeMap<String, String> = std::env::vars().collect();

        if env_file.exists() {
            let file_vars = parse_env_file(env_file)?;
            merge_fill_missing(&mut vars, &file_vars);
        } else {
            tracing::debug!("env file {} not found, using process env only", env_file.display());
        }

        Self::from_vars(&vars)
    }

    pub fn from_vars(vars: &BTreeMap<String, String>) -> Result<Self> {
        let network = match vars.get(KEY_NETWORK).map(|s| s.trim()) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => bail!("{KEY_NETWORK} is not set; cannot pick a deployment network"),
        };

        Ok(Self {
            network,
            admin: get_nonempty(vars, KEY_ADMIN),
            staking: get_nonempty(vars, KEY_STAKING),
            assets_management: get_nonempty(vars, KEY_ASSETS_MANAGEMENT),
        })
    }

    pub fn is_local(&self) -> bool {
        self.network == "local"
    }
}

/// Parse a `KEY=value` env file. Comments, blank lines, quoted values and
/// values containing `=` are handled; lines without `=` are skipped.
pub fn parse_env_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read env file at {}", path.display()))?;

    let mut out = BTreeMap::new();
    for line in text.lines() {
        let raw = line.trim();
        if raw.is_empty() || raw.starts_with('#') {
            continue;
        }

        let Some((k, v)) = raw.split_once('=') else {
            continue;
        };

        let key = k.trim().to_string();
        if key.is_empty() {
            continue;
        }

        out.insert(key, unquote(v.trim()));
    }

    Ok(out)
}

/// Keys already present in `vars` win; only gaps are filled from `extra`.
pub fn merge_fill_missing(vars: &mut BTreeMap<String, String>, extra: &BTreeMap<String, String>) {
    for (k, v) in extra {
        if !vars.contains_key(k) {
            vars.insert(k.clone(), v.clone());
        }
    }
}

// -------------------- helpers --------------------

fn get_nonempty(vars: &BTreeMap<String, String>, key: &str) -> Option<String> {
    vars.get(key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn unquote(val: &str) -> String {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        val[1..val.len() - 1].to_string()
    } else {
        val.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_env(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parses_simple_file() {
        let f = write_env("DFX_NETWORK=local\nCANISTER_ID_ADMIN=aaa\n");
        let vars = parse_env_file(f.path()).unwrap();
        assert_eq!(vars.get("DFX_NETWORK"), Some(&"local".to_string()));
        assert_eq!(vars.get("CANISTER_ID_ADMIN"), Some(&"aaa".to_string()));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let f = write_env("# deployment target\n\nDFX_NETWORK=ic\n# done\n");
        let vars = parse_env_file(f.path()).unwrap();
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn strips_matching_quotes() {
        let f = write_env("A=\"double\"\nB='single'\nC=plain\n");
        let vars = parse_env_file(f.path()).unwrap();
        assert_eq!(vars.get("A"), Some(&"double".to_string()));
        assert_eq!(vars.get("B"), Some(&"single".to_string()));
        assert_eq!(vars.get("C"), Some(&"plain".to_string()));
    }

    #[test]
    fn keeps_equals_inside_value() {
        let f = write_env("URL=https://ic0.app?canister=abc\n");
        let vars = parse_env_file(f.path()).unwrap();
        assert_eq!(
            vars.get("URL"),
            Some(&"https://ic0.app?canister=abc".to_string())
        );
    }

    #[test]
    fn merge_does_not_override_existing() {
        let mut vars = BTreeMap::from([("DFX_NETWORK".to_string(), "ic".to_string())]);
        let extra = BTreeMap::from([
            ("DFX_NETWORK".to_string(), "local".to_string()),
            ("CANISTER_ID_STAKING".to_string(), "sss".to_string()),
        ]);
        merge_fill_missing(&mut vars, &extra);
        assert_eq!(vars.get("DFX_NETWORK"), Some(&"ic".to_string()));
        assert_eq!(vars.get("CANISTER_ID_STAKING"), Some(&"sss".to_string()));
    }

    #[test]
    fn from_vars_requires_network() {
        let vars = BTreeMap::from([("CANISTER_ID_ADMIN".to_string(), "aaa".to_string())]);
        assert!(DeployEnv::from_vars(&vars).is_err());
    }

    #[test]
    fn from_vars_reads_named_fields() {
        let vars = BTreeMap::from([
            ("DFX_NETWORK".to_string(), "local".to_string()),
            ("CANISTER_ID_ADMIN".to_string(), "aaa".to_string()),
            ("CANISTER_ID_STAKING".to_string(), "".to_string()),
        ]);
        let env = DeployEnv::from_vars(&vars).unwrap();
        assert!(env.is_local());
        assert_eq!(env.admin.as_deref(), Some("aaa"));
        assert_eq!(env.staking, None);
        assert_eq!(env.assets_management, None);
    }
}
