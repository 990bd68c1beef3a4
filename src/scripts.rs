use anyhow::{Context as _, Result};
use minijinja::Environment;
use serde_json::json;

use crate::{
    ids::{id_for, CanisterConfig},
    resolver::Mode,
};

/// Canisters that get a deploy script and appear in generate-rpc.sh.
/// `admin` is configured but deployed elsewhere.
pub const DEPLOYED_CANISTERS: [&str; 2] = ["staking", "assets_management"];

const GENERATE_RPC_TPL: &str = r#"#!/bin/bash
{% for name in canisters %}
# generate {{ name }} candid file
cargo build --target wasm32-unknown-unknown --release --package {{ name }} --locked
candid-extractor target/wasm32-unknown-unknown/release/{{ name }}.wasm > canisters/{{ name }}/{{ name }}.did
dfx generate {{ name }}
{% endfor %}"#;

const DEPLOY_TPL: &str = r#"#!/bin/bash
{%- if build %}
{{ build }}
{%- endif %}
dfx deploy {{ name }}{% if argument %} --argument '{{ argument }}'{% endif %} --network {{ network }}{% if specified_id %} --specified-id {{ specified_id }}{% endif %}
{%- if grant_controller %}
dfx canister update-settings {{ name }} --add-controller {{ admin }} --network {{ network }}
{%- endif %}
{%- if subscribe %}
dfx canister call {{ name }} setup_subscribe '(principal "{{ admin }}")' --network {{ network }}
{%- endif %}
"#;

/// One deploy script to render. Values are interpolated verbatim; nothing is
/// shell-escaped (the environment is trusted here, as in the original tool).
#[derive(Debug, Clone, Default)]
pub struct DeployPlan<'a> {
    pub name: &'a str,
    pub network: &'a str,
    pub admin: &'a str,
    /// Constructor argument passed via `--argument '...'`.
    pub argument: Option<&'a str>,
    /// Command line prepended before `dfx deploy`.
    pub build: Option<&'a str>,
    /// `--specified-id` value; set only on the local network.
    pub specified_id: Option<&'a str>,
    pub subscribe: bool,
    pub grant_controller: bool,
}

#[derive(Debug, Clone)]
pub struct RenderedScript {
    pub file_name: String,
    pub text: String,
}

/// Build + candid extraction + binding generation, fixed canister sequence.
pub fn render_generate_rpc() -> Result<String> {
    render(GENERATE_RPC_TPL, &json!({ "canisters": DEPLOYED_CANISTERS }))
        .context("failed to render generate-rpc.sh")
}

pub fn render_deploy(plan: &DeployPlan<'_>) -> Result<String> {
    render(
        DEPLOY_TPL,
        &json!({
            "name": plan.name,
            "network": plan.network,
            "admin": plan.admin,
            "argument": plan.argument,
            "build": plan.build,
            "specified_id": plan.specified_id,
            "subscribe": plan.subscribe,
            "grant_controller": plan.grant_controller,
        }),
    )
    .with_context(|| format!("failed to render deploy script for {}", plan.name))
}

/// Every script for one run: generate-rpc.sh plus a deploy-and-subscribe
/// script per deployed canister. Dfx mode inserts the add-controller step
/// between deploy and subscribe.
pub fn render_all(mode: Mode, network: &str, config: &CanisterConfig) -> Result<Vec<RenderedScript>> {
    let admin = id_for(config, "admin", network);
    let local = network == "local";

    let mut out = vec![RenderedScript {
        file_name: "generate-rpc.sh".to_string(),
        text: render_generate_rpc()?,
    }];

    for name in DEPLOYED_CANISTERS {
        let id = id_for(config, name, network);
        let plan = DeployPlan {
            name,
            network,
            admin,
            specified_id: local.then_some(id),
            subscribe: true,
            grant_controller: mode == Mode::Dfx,
            ..Default::default()
        };
        out.push(RenderedScript {
            file_name: format!("deploy-{}.sh", name.replace('_', "-")),
            text: render_deploy(&plan)?,
        });
    }

    Ok(out)
}

fn render(source: &str, ctx_json: &serde_json::Value) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("tpl", source)?;
    let tpl = env.get_template("tpl")?;
    let v = minijinja::value::Value::from_serialize(ctx_json);
    Ok(tpl.render(v)?)
}
