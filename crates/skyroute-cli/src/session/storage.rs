//! Session storage for persisting login state.
//!
//! The file holds the base URL, the username and the token pair. The
//! password is never written.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use skyroute_core::{BaseUrl, Credential, TokenPair};
use skyroute_xrpc::{ClientConfig, HttpTransport, SessionManager, XrpcClient};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Stored session data.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    base_url: String,
    username: String,
    access_jwt: String,
    refresh_jwt: String,
}

/// Get the session file path.
pub fn session_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "skyroute").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("session.json"))
}

/// Save the client's current session to disk.
pub async fn save_session(client: &XrpcClient) -> Result<()> {
    let tokens = client
        .session()
        .tokens()
        .await
        .context("Client holds no session")?;
    let credential = client.session().credential();

    let stored = StoredSession {
        base_url: credential.base_url().to_string(),
        username: credential.username().to_string(),
        access_jwt: tokens.access.as_str().to_string(),
        refresh_jwt: tokens.refresh.as_str().to_string(),
    };

    let path = session_path()?;
    let json = serde_json::to_string_pretty(&stored)?;

    fs::write(&path, &json).context("Failed to write session file")?;

    // Set restrictive permissions (Unix only)
    #[cfg(unix)]
    {
        let mut perms = fs::metadata(&path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms)?;
    }

    debug!(path = %path.display(), "Session saved");
    Ok(())
}

/// Load a session from disk as a ready client.
///
/// The restored client has no password, so once its refresh token is
/// rejected the user has to log in again.
pub async fn load_session(config: ClientConfig) -> Result<Option<XrpcClient>> {
    let path = session_path()?;

    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(&path).context("Failed to read session file")?;
    let stored: StoredSession = serde_json::from_str(&json).context("Invalid session file")?;

    let base_url = BaseUrl::new(&stored.base_url).context("Invalid base URL in session")?;
    let credential = Credential::without_password(base_url, stored.username);
    let tokens = TokenPair::new(stored.access_jwt, stored.refresh_jwt);

    let transport =
        Arc::new(HttpTransport::new(&config.user_agent).context("Failed to build HTTP client")?);
    let manager = SessionManager::restore(credential, tokens, config, transport);

    Ok(Some(XrpcClient::from_session(manager)))
}

/// Clear the stored session. Returns whether a file was removed.
pub async fn clear_session() -> Result<bool> {
    let path = session_path()?;

    if !path.exists() {
        return Ok(false);
    }

    fs::remove_file(&path).context("Failed to remove session file")?;
    debug!(path = %path.display(), "Session removed");
    Ok(true)
}
