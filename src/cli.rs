use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::resolver::Mode;

#[derive(Parser, Debug)]
#[command(name = "rigging", version, about)]
pub struct Args {
    /// How canister identifiers are resolved
    #[arg(long, value_enum, default_value_t = ModeArg::Env)]
    pub mode: ModeArg,

    /// Path to the .env file (process env always wins)
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,

    /// Path to rigging.toml (defaults apply when omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory the JSON and scripts are written to
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Render everything to stdout instead of writing files
    #[arg(long, default_value_t = false)]
    pub print: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Identifiers come from CANISTER_ID_* environment variables
    Env,
    /// On the local network, ask `dfx canister id`; adds the
    /// add-controller step to deploy scripts
    Dfx,
}

impl From<ModeArg> for Mode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Env => Mode::Env,
            ModeArg::Dfx => Mode::Dfx,
        }
    }
}
