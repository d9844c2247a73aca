//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use skyroute_xrpc::ClientConfig;

use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs) -> Result<()> {
    let Some(client) = storage::load_session(ClientConfig::default())
        .await
        .context("Failed to load session")?
    else {
        output::warning("No active session");
        return Ok(());
    };

    output::progress("Revoking session...");
    client.sign_out().await;

    storage::clear_session()
        .await
        .context("Failed to remove session file")?;

    output::success("Logged out");
    Ok(())
}
