//! XRPC endpoint names and session exchange payloads.

use serde::Serialize;
use serde_json::Value;

use skyroute_core::TokenPair;

/// com.atproto.server.createSession
pub const CREATE_SESSION: &str = "com.atproto.server.createSession";

/// com.atproto.server.refreshSession
pub const REFRESH_SESSION: &str = "com.atproto.server.refreshSession";

/// com.atproto.server.deleteSession
pub const DELETE_SESSION: &str = "com.atproto.server.deleteSession";

/// app.bsky.actor.getPreferences, used as the connectivity and staleness probe.
pub const GET_PREFERENCES: &str = "app.bsky.actor.getPreferences";

/// Request body for createSession.
///
/// Deliberately not `Debug`: it carries the password.
#[derive(Serialize)]
pub(crate) struct CreateSessionRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

/// Extract the token pair from a createSession or refreshSession body.
///
/// Both `accessJwt` and `refreshJwt` must be present and be strings; the
/// error names the first field that is not.
pub(crate) fn parse_token_pair(body: &[u8]) -> Result<TokenPair, String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|_| "response body is not JSON".to_string())?;

    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| format!("'{}' is missing or not a string", name))
    };

    let access = field("accessJwt")?;
    let refresh = field("refreshJwt")?;
    Ok(TokenPair::new(access, refresh))
}

/// Handle reported alongside the tokens, for log context only.
pub(crate) fn session_handle(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<Value>(body)
        .ok()?
        .get("handle")?
        .as_str()
        .map(str::to_string)
}
