//! Refresh command implementation.

use anyhow::{Context, Result};
use clap::Args;

use skyroute_xrpc::ClientConfig;

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(_args: RefreshArgs) -> Result<()> {
    let client = session::require_session(ClientConfig::default()).await?;

    output::progress("Refreshing session...");

    client
        .session()
        .refresh_session()
        .await
        .context("Failed to refresh session")?;

    session::persist(&client)
        .await
        .context("Failed to save refreshed session")?;

    output::success("Session refreshed successfully");
    output::field("Username", client.session().credential().username());

    Ok(())
}
