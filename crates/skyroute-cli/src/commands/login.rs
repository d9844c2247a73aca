//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;

use skyroute_core::types::DEFAULT_BASE_URL;
use skyroute_core::{BaseUrl, Credential};
use skyroute_xrpc::{ClientConfig, XrpcClient};

use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Handle or email to authenticate with
    #[arg(long, env = "BSKY_USERNAME")]
    pub username: String,

    /// Account password or app password
    #[arg(long, env = "BSKY_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// XRPC base URL
    #[arg(long, env = "BSKY_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

pub async fn run(args: LoginArgs) -> Result<()> {
    let base_url = BaseUrl::new(&args.base_url).context("Invalid base URL")?;
    let credential = Credential::new(base_url, args.username, args.password);

    output::progress("Logging in...");

    let client = XrpcClient::new(credential, ClientConfig::default())
        .context("Failed to build HTTP client")?;
    let manager = client.authenticate().await.context("Failed to login")?;

    storage::save_session(&client)
        .await
        .context("Failed to save session")?;

    output::success("Logged in successfully");
    println!();
    output::field("Username", manager.credential().username());
    output::field("Base URL", manager.credential().base_url().as_str());
    if let Some(session) = manager.snapshot().await {
        output::field("Issued", &session.issued_at().to_rfc3339());
    }

    Ok(())
}
