use anyhow::{Context as _, Result};
use std::{fs, path::Path};

use crate::{ids, ids::CanisterConfig, scripts::RenderedScript};

pub const CANISTER_IDS_FILE: &str = "canister_ids.json";

/// Write the JSON config and every script under `out_dir`, overwriting
/// whatever is there. No rollback: a failure partway leaves earlier files
/// in place.
pub fn write_outputs(
    out_dir: &Path,
    config: &CanisterConfig,
    scripts: &[RenderedScript],
) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    write_file(&out_dir.join(CANISTER_IDS_FILE), &ids::to_json(config)?)?;

    for script in scripts {
        let path = out_dir.join(&script.file_name);
        write_file(&path, &script.text)?;
        make_executable(&path)?;
    }

    Ok(())
}

/// Render everything to stdout instead of touching the filesystem.
pub fn print_outputs(config: &CanisterConfig, scripts: &[RenderedScript]) -> Result<()> {
    let mut out = String::new();

    out.push_str(&format!("# --- {CANISTER_IDS_FILE} ---\n"));
    out.push_str(&ids::to_json(config)?);
    out.push('\n');

    for script in scripts {
        out.push_str(&format!("\n# --- {} ---\n", script.file_name));
        out.push_str(&script.text);
        if !script.text.ends_with('\n') {
            out.push('\n');
        }
    }

    print!("{out}");
    Ok(())
}

fn write_file(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!("wrote {}", path.display());
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt as _;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("failed to chmod {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ids::canister_config, resolver::ResolvedIds, scripts};

    fn sample() -> (CanisterConfig, Vec<RenderedScript>) {
        let config = canister_config(
            "local",
            &ResolvedIds {
                admin: Some("aaa".to_string()),
                staking: Some("sss".to_string()),
                assets_management: Some("mmm".to_string()),
            },
        );
        let scripts = scripts::render_all(crate::resolver::Mode::Env, "local", &config).unwrap();
        (config, scripts)
    }

    #[test]
    fn writes_json_and_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let (config, scripts) = sample();

        write_outputs(dir.path(), &config, &scripts).unwrap();

        let json = fs::read_to_string(dir.path().join(CANISTER_IDS_FILE)).unwrap();
        let back: CanisterConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);

        for name in ["generate-rpc.sh", "deploy-staking.sh", "deploy-assets-management.sh"] {
            let text = fs::read_to_string(dir.path().join(name)).unwrap();
            assert!(text.starts_with("#!/bin/bash"), "{name}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn scripts_are_executable() {
        use std::os::unix::fs::PermissionsExt as _;

        let dir = tempfile::tempdir().unwrap();
        let (config, scripts) = sample();
        write_outputs(dir.path(), &config, &scripts).unwrap();

        let mode = fs::metadata(dir.path().join("deploy-staking.sh"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn rerun_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let (config, scripts) = sample();

        write_outputs(dir.path(), &config, &scripts).unwrap();
        let first = fs::read(dir.path().join("deploy-staking.sh")).unwrap();

        let (config2, scripts2) = sample();
        write_outputs(dir.path(), &config2, &scripts2).unwrap();
        let second = fs::read(dir.path().join("deploy-staking.sh")).unwrap();

        assert_eq!(first, second);
    }
}
