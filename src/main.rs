use anyhow::Result;
use clap::Parser as _;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rigging::{cli::Args, config::Config, env::DeployEnv, ids, output, resolver, scripts};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rigging=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let cfg = Config::load_optional(args.config.as_deref())?;
    let mode = args.mode.into();

    // load environment → resolve identifiers → write JSON → write scripts
    let env = DeployEnv::load(&args.env_file)?;
    tracing::debug!(network = %env.network, ?mode, "environment loaded");

    let resolved = resolver::resolve_ids(mode, &env, &cfg.dfx)?;
    let config = ids::canister_config(&env.network, &resolved);
    let rendered = scripts::render_all(mode, &env.network, &config)?;

    if args.print {
        return output::print_outputs(&config, &rendered);
    }

    let out_dir = args
        .out_dir
        .or_else(|| cfg.output.dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    output::write_outputs(&out_dir, &config, &rendered)
}
