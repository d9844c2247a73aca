//! Stored session handling for the CLI.

pub mod storage;

use anyhow::{Context, Result};
use tracing::debug;

use skyroute_core::SessionStatus;
use skyroute_xrpc::{ClientConfig, XrpcClient};

/// Load the stored session or fail with a hint to log in.
pub async fn require_session(config: ClientConfig) -> Result<XrpcClient> {
    storage::load_session(config)
        .await
        .context("Failed to load session")?
        .context("No active session. Run 'skyroute login' first.")
}

/// Write back whatever the client holds now.
///
/// A refreshed pair replaces the stored one and a session that was reset
/// (e.g. by `server.deleteSession`) removes the file. A failed session keeps
/// the stored pair: the refresh may have failed for a transient reason.
pub async fn persist(client: &XrpcClient) -> Result<()> {
    match client.session().status().await {
        SessionStatus::Authenticated | SessionStatus::Stale => storage::save_session(client).await,
        SessionStatus::Unauthenticated => storage::clear_session().await.map(|_| ()),
        SessionStatus::Failed => {
            debug!("Session failed, keeping stored tokens");
            Ok(())
        }
    }
}
