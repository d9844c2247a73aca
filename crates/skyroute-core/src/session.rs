//! Session values and staleness detection.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::request::RenderedRequest;
use crate::tokens::{AccessToken, RefreshToken, TokenPair};

/// XRPC error codes that mean the bearer token is no longer accepted.
pub const STALE_TOKEN_ERRORS: &[&str] = &["ExpiredToken", "InvalidToken"];

/// One generation of an authenticated session.
///
/// The access and refresh tokens always travel together: a `Session` is
/// replaced as a whole, never patched, so any snapshot holds a pair issued
/// by the same exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    tokens: TokenPair,
    issued_at: DateTime<Utc>,
    generation: u64,
}

impl Session {
    pub fn new(tokens: TokenPair, generation: u64) -> Self {
        Self {
            tokens,
            issued_at: Utc::now(),
            generation,
        }
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.tokens.access
    }

    pub fn refresh_token(&self) -> &RefreshToken {
        &self.tokens.refresh
    }

    pub fn tokens(&self) -> &TokenPair {
        &self.tokens
    }

    /// When this pair was obtained locally.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Monotonic counter identifying the exchange that produced this pair.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Attach this session's bearer token to a request.
    ///
    /// Pure header injection: no network, no state change.
    pub fn authorize(&self, request: RenderedRequest) -> RenderedRequest {
        request.with_bearer(&self.tokens.access)
    }
}

/// Lifecycle state of a session manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No exchange has happened yet (or the session was reset).
    Unauthenticated,
    /// A token pair is held and was last accepted by the server.
    Authenticated,
    /// The server rejected the access token; a refresh is required.
    Stale,
    /// Establishing or refreshing failed; calls fail until reset.
    Failed,
}

/// Returns true if a response says the bearer token is expired or invalid.
///
/// Detection is reactive: only a server answer can make a session stale.
/// Bluesky reports expired tokens as HTTP 400 `ExpiredToken`; some PDS
/// implementations use 401, which is accepted too.
pub fn is_stale(status: u16, body: &[u8]) -> bool {
    if status != 400 && status != 401 {
        return false;
    }

    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_string))
        .is_some_and(|code| STALE_TOKEN_ERRORS.contains(&code.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;

    #[test]
    fn expired_token_400_is_stale() {
        let body = br#"{"error":"ExpiredToken","message":"Token has expired"}"#;
        assert!(is_stale(400, body));
    }

    #[test]
    fn invalid_token_is_stale() {
        assert!(is_stale(400, br#"{"error":"InvalidToken"}"#));
        assert!(is_stale(401, br#"{"error":"InvalidToken"}"#));
    }

    #[test]
    fn other_errors_are_not_stale() {
        assert!(!is_stale(400, br#"{"error":"InvalidRequest"}"#));
        assert!(!is_stale(400, b"not json"));
        assert!(!is_stale(500, br#"{"error":"ExpiredToken"}"#));
        assert!(!is_stale(200, br#"{}"#));
    }

    #[test]
    fn authorize_uses_access_token() {
        let session = Session::new(TokenPair::new("A", "R"), 1);
        let request = session.authorize(RenderedRequest::new(Method::Get, "https://x.test/m"));
        assert_eq!(request.header("authorization"), Some("Bearer A"));
    }
}
