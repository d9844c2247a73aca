//! Test command implementation.

use anyhow::{Context, Result};
use clap::Args;

use skyroute_xrpc::{ClientConfig, ProbeOutcome};

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct TestArgs {}

pub async fn run(_args: TestArgs) -> Result<()> {
    let client = session::require_session(ClientConfig::default()).await?;

    output::progress("Probing server...");

    let outcome = client
        .test_connection()
        .await
        .context("Connection test failed")?;

    match outcome {
        ProbeOutcome::Healthy => output::success("Connection healthy"),
        ProbeOutcome::Stale => {
            output::warning("Access token is stale, refreshing");
            client
                .session()
                .refresh_session()
                .await
                .context("Failed to refresh session")?;
            session::persist(&client)
                .await
                .context("Failed to save refreshed session")?;
            output::success("Session refreshed");
        }
    }

    output::field("Base URL", client.router().base_url().as_str());
    Ok(())
}
