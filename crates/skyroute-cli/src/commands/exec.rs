//! Exec command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use skyroute_core::Params;
use skyroute_xrpc::ClientConfig;

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Resource name (e.g. feed, actor, app.bsky.feed)
    pub resource: String,

    /// Action name (e.g. getTimeline)
    pub action: String,

    /// Parameter as name=value (repeatable)
    #[arg(short, long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, Value)>,

    /// Probe the server before executing
    #[arg(long)]
    pub probe: bool,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

/// The operation's outcome wins; a failure to save the session is only warned about.
fn settle(
    result: Result<Value, skyroute_core::Error>,
    persisted: Result<()>,
) -> Result<Value, skyroute_core::Error> {
    if let Err(e) = persisted {
        output::warning(&format!("Failed to save session: {:#}", e));
    }
    result
}

fn parse_param(s: &str) -> Result<(String, Value), String> {
    Params::parse_pair(s).map_err(|e| e.to_string())
}

pub async fn run(args: ExecArgs) -> Result<()> {
    let config = ClientConfig {
        probe_before_request: args.probe,
        ..ClientConfig::default()
    };
    let client = session::require_session(config).await?;
    let params: Params = args.params.into_iter().collect();

    let result = client.execute(&args.resource, &args.action, &params).await;

    // Tokens may have been refreshed even if the call itself failed.
    let persisted = session::persist(&client).await;

    let value = settle(result, persisted)
        .with_context(|| format!("{}.{} failed", args.resource, args.action))?;

    if args.compact {
        output::json(&value)
    } else {
        output::json_pretty(&value)
    }
}
