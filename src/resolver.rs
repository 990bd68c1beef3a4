use std::{
    io::Read as _,
    process::{Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use thiserror::Error;

use crate::{config::DfxConfig, env::DeployEnv};

/// How per-canister identifiers are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Straight from the environment.
    Env,
    /// `dfx canister id <name>` on the local network, environment fallback
    /// elsewhere.
    Dfx,
}

/// A `dfx canister id` lookup that did not yield a usable identifier.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("failed to spawn `{bin} canister id {name}`: {source}")]
    Spawn {
        bin: String,
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{bin} canister id {name}` exited with {code:?}: {stderr}")]
    CommandFailed {
        bin: String,
        name: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("`{bin} canister id {name}` did not finish within {secs}s")]
    TimedOut { bin: String, name: String, secs: u64 },

    #[error("`{bin} canister id {name}` produced unparseable output: {output:?}")]
    Unparseable {
        bin: String,
        name: String,
        output: String,
    },
}

/// Identifiers for the fixed canister set after resolution, still keyed by
/// named fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIds {
    pub admin: Option<String>,
    pub staking: Option<String>,
    pub assets_management: Option<String>,
}

/// Resolve the identifier for every canister.
///
/// Env mode passes the environment values through. Dfx mode asks the running
/// local replica for each identifier when the network is `local`; on any
/// other network the environment value is the fallback, unchanged. A failed
/// lookup aborts the whole run.
pub fn resolve_ids(mode: Mode, env: &DeployEnv, dfx: &DfxConfig) -> Result<ResolvedIds, LookupError> {
    if mode == Mode::Env || !env.is_local() {
        if mode == Mode::Dfx {
            tracing::debug!(network = %env.network, "non-local network, using environment fallbacks");
        }
        return Ok(ResolvedIds {
            admin: env.admin.clone(),
            staking: env.staking.clone(),
            assets_management: env.assets_management.clone(),
        });
    }

    let timeout = Duration::from_secs(dfx.lookup_timeout_secs);
    Ok(ResolvedIds {
        admin: Some(lookup_canister_id(&dfx.bin, "admin", timeout)?),
        staking: Some(lookup_canister_id(&dfx.bin, "staking", timeout)?),
        assets_management: Some(lookup_canister_id(&dfx.bin, "assets_management", timeout)?),
    })
}

/// Run `<bin> canister id <name>` with captured output and a hard deadline.
/// The child is killed if the deadline passes. Success value is stdout with
/// surrounding whitespace stripped; it must be a single token.
pub fn lookup_canister_id(bin: &str, name: &str, timeout: Duration) -> Result<String, LookupError> {
    let mut child = Command::new(bin)
        .args(["canister", "id", name])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| LookupError::Spawn {
            bin: bin.to_string(),
            name: name.to_string(),
            source,
        })?;

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(LookupError::TimedOut {
                        bin: bin.to_string(),
                        name: name.to_string(),
                        secs: timeout.as_secs(),
                    });
                }
                thread::sleep(Duration::from_millis(20));
            }
            Err(source) => {
                let _ = child.kill();
                return Err(LookupError::Spawn {
                    bin: bin.to_string(),
                    name: name.to_string(),
                    source,
                });
            }
        }
    };

    let mut stdout = String::new();
    if let Some(mut out) = child.stdout.take() {
        let _ = out.read_to_string(&mut stdout);
    }
    let mut stderr = String::new();
    if let Some(mut err) = child.stderr.take() {
        let _ = err.read_to_string(&mut stderr);
    }

    if !status.success() {
        return Err(LookupError::CommandFailed {
            bin: bin.to_string(),
            name: name.to_string(),
            code: status.code(),
            stderr: stderr.trim().to_string(),
        });
    }

    let id = stdout.trim();
    if id.is_empty() || id.contains(char::is_whitespace) {
        return Err(LookupError::Unparseable {
            bin: bin.to_string(),
            name: name.to_string(),
            output: stdout,
        });
    }

    tracing::debug!(canister = name, id, "resolved via {bin}");
    Ok(id.to_string())
}
