//! Session lifecycle: establish, authenticate, detect staleness, refresh.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use skyroute_core::error::{AuthError, Error, ProtocolError, TransportError};
use skyroute_core::request::AUTHORIZATION;
use skyroute_core::{
    Credential, Method, RefreshToken, RenderedRequest, Session, SessionStatus, TokenPair,
    Transport, TransportResponse, is_stale,
};

use crate::config::ClientConfig;
use crate::endpoints::{
    CREATE_SESSION, CreateSessionRequest, DELETE_SESSION, GET_PREFERENCES, REFRESH_SESSION,
    parse_token_pair, session_handle,
};
use crate::transport::HttpTransport;

/// Result of a connectivity probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The server accepted the current access token.
    Healthy,
    /// The server rejected the access token; the session is now stale.
    Stale,
}

/// Owns the authentication state for one [`Credential`].
///
/// The manager is cheap to clone (internal `Arc`) and every clone shares
/// the same state. Readers take a consistent snapshot of the token pair;
/// establishing and refreshing are serialized so at most one exchange is in
/// flight, and callers that queued behind it reuse its result.
///
/// # Example
///
/// ```no_run
/// use skyroute_core::{BaseUrl, Credential, Method, RenderedRequest};
/// use skyroute_xrpc::{ClientConfig, SessionManager};
///
/// # async fn example() -> Result<(), skyroute_core::Error> {
/// let credential = Credential::new(BaseUrl::default(), "alice.bsky.social", "app-password");
/// let manager = SessionManager::new(credential, ClientConfig::default())?;
///
/// let request = RenderedRequest::new(Method::Get, "https://bsky.social/xrpc/app.bsky.feed.getTimeline");
/// let request = manager.authenticate_request(request).await?;
/// assert!(request.header("authorization").is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    credential: Credential,
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    state: RwLock<State>,
    /// Held for the duration of any establish or refresh exchange.
    exchange: Mutex<()>,
    generations: AtomicU64,
}

#[derive(Debug, Clone)]
enum State {
    Unauthenticated,
    Authenticated(Session),
    Stale(Session),
    Failed(AuthError),
}

impl State {
    fn status(&self) -> SessionStatus {
        match self {
            State::Unauthenticated => SessionStatus::Unauthenticated,
            State::Authenticated(_) => SessionStatus::Authenticated,
            State::Stale(_) => SessionStatus::Stale,
            State::Failed(_) => SessionStatus::Failed,
        }
    }
}

impl SessionManager {
    /// Create a manager with the default reqwest transport.
    ///
    /// No network traffic happens until a session is needed.
    pub fn new(credential: Credential, config: ClientConfig) -> Result<Self, TransportError> {
        let transport = Arc::new(HttpTransport::new(&config.user_agent)?);
        Ok(Self::with_transport(credential, config, transport))
    }

    /// Create a manager that dispatches through a caller-supplied transport.
    pub fn with_transport(
        credential: Credential,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self::with_state(credential, config, transport, None)
    }

    /// Create a manager seeded with a previously exported token pair.
    ///
    /// The caller is responsible for the pair belonging to `credential`.
    pub fn restore(
        credential: Credential,
        tokens: TokenPair,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self::with_state(credential, config, transport, Some(tokens))
    }

    fn with_state(
        credential: Credential,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        tokens: Option<TokenPair>,
    ) -> Self {
        let (state, generation) = match tokens {
            Some(tokens) => (State::Authenticated(Session::new(tokens, 1)), 1),
            None => (State::Unauthenticated, 0),
        };

        Self {
            inner: Arc::new(ManagerInner {
                credential,
                config,
                transport,
                state: RwLock::new(state),
                exchange: Mutex::new(()),
                generations: AtomicU64::new(generation),
            }),
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.inner.credential
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.inner.transport
    }

    /// Current lifecycle state.
    pub async fn status(&self) -> SessionStatus {
        self.inner.state.read().await.status()
    }

    /// Snapshot of the held session, stale or not.
    pub async fn snapshot(&self) -> Option<Session> {
        match &*self.inner.state.read().await {
            State::Authenticated(session) | State::Stale(session) => Some(session.clone()),
            State::Unauthenticated | State::Failed(_) => None,
        }
    }

    /// Export the held token pair so a host can persist it.
    ///
    /// # Security
    ///
    /// Handle the returned tokens securely. They grant access to the account.
    pub async fn tokens(&self) -> Option<TokenPair> {
        self.snapshot().await.map(|s| s.tokens().clone())
    }

    /// Exchange the credential's username and password for a new session.
    ///
    /// Replaces any held session. No retry is attempted.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredentials`] on HTTP 4xx or an incomplete credential
    /// - [`AuthError::ServiceUnavailable`] on HTTP 5xx or a network failure
    /// - [`AuthError::MalformedResponse`] if the token pair cannot be read
    pub async fn establish_session(&self) -> Result<Session, AuthError> {
        let _exchange = self.inner.exchange.lock().await;
        self.establish_locked().await
    }

    /// Return a usable session, establishing or refreshing it if needed.
    ///
    /// Calls that arrive while an exchange is in flight wait for it and
    /// share its outcome.
    pub async fn current_session(&self) -> Result<Session, AuthError> {
        match self.inner.state.read().await.clone() {
            State::Authenticated(session) => return Ok(session),
            State::Failed(err) => return Err(err),
            State::Unauthenticated | State::Stale(_) => {}
        }

        let _exchange = self.inner.exchange.lock().await;

        // Whoever held the lock before us may already have done the work.
        let state = self.inner.state.read().await.clone();
        match state {
            State::Authenticated(session) => Ok(session),
            State::Failed(err) => Err(err),
            State::Stale(session) => self.refresh_locked(session).await,
            State::Unauthenticated => self.establish_locked().await,
        }
    }

    /// Attach `Authorization: Bearer <accessToken>` to a request.
    ///
    /// Existing headers are kept; an existing authorization header is
    /// replaced. The network is only touched when no session exists yet or
    /// the held one has been reported stale.
    pub async fn authenticate_request(
        &self,
        request: RenderedRequest,
    ) -> Result<RenderedRequest, AuthError> {
        let session = self.current_session().await?;
        Ok(session.authorize(request))
    }

    /// Flag the session stale if `generation` is still the live one.
    ///
    /// Returns false when the report is late (the pair was already replaced)
    /// or there is no authenticated session.
    pub async fn mark_stale(&self, generation: u64) -> bool {
        let mut state = self.inner.state.write().await;
        let session = match &*state {
            State::Authenticated(session) if session.generation() == generation => session.clone(),
            _ => return false,
        };
        info!(generation, "Session marked stale");
        *state = State::Stale(session);
        true
    }

    /// Exchange the refresh token for a new token pair.
    ///
    /// Both tokens are replaced together. On failure the manager enters the
    /// failed state and stays there until [`reset`](Self::reset).
    pub async fn refresh_session(&self) -> Result<Session, AuthError> {
        let _exchange = self.inner.exchange.lock().await;

        let state = self.inner.state.read().await.clone();
        match state {
            State::Authenticated(session) | State::Stale(session) => {
                self.refresh_locked(session).await
            }
            State::Failed(err) => Err(err),
            State::Unauthenticated => Err(AuthError::RefreshFailed {
                reason: "no session to refresh".to_string(),
            }),
        }
    }

    /// Probe `getPreferences` with the current bearer token.
    ///
    /// A stale answer marks the session stale; it is refreshed on next use.
    #[instrument(skip(self), fields(username = %self.inner.credential.username()))]
    pub async fn probe(&self) -> Result<ProbeOutcome, Error> {
        let session = self.current_session().await?;
        let request = session.authorize(RenderedRequest::new(
            Method::Get,
            self.inner.credential.base_url().endpoint(GET_PREFERENCES),
        ));

        let response = self
            .inner
            .transport
            .send(&request, self.inner.config.primary_timeout())
            .await?;

        if response.is_success() {
            debug!("Probe succeeded");
            Ok(ProbeOutcome::Healthy)
        } else if is_stale(response.status, &response.body) {
            self.mark_stale(session.generation()).await;
            Ok(ProbeOutcome::Stale)
        } else {
            Err(ProtocolError::from_body(response.status, &response.body).into())
        }
    }

    /// Forget the held session and any recorded failure.
    pub async fn reset(&self) {
        let _exchange = self.inner.exchange.lock().await;
        *self.inner.state.write().await = State::Unauthenticated;
        debug!("Session reset");
    }

    /// Revoke the session server-side, then forget it locally.
    ///
    /// Revocation is best effort: it uses the auxiliary timeout and its
    /// failures are logged, never returned.
    #[instrument(skip(self), fields(username = %self.inner.credential.username()))]
    pub async fn sign_out(&self) {
        let _exchange = self.inner.exchange.lock().await;
        let previous = std::mem::replace(&mut *self.inner.state.write().await, State::Unauthenticated);

        let session = match previous {
            State::Authenticated(session) | State::Stale(session) => session,
            State::Unauthenticated | State::Failed(_) => return,
        };

        let request = self.refresh_request(DELETE_SESSION, session.refresh_token());
        match self
            .inner
            .transport
            .send(&request, self.inner.config.auxiliary_timeout())
            .await
        {
            Ok(response) if response.is_success() => info!("Session revoked"),
            Ok(response) => warn!(status = response.status, "Session revocation rejected"),
            Err(e) => warn!(error = %e, "Session revocation failed"),
        }
    }

    #[instrument(skip(self), fields(username = %self.inner.credential.username()))]
    async fn establish_locked(&self) -> Result<Session, AuthError> {
        info!("Creating new session");

        match self.exchange_password().await {
            Ok(tokens) => {
                let session = Session::new(tokens, self.next_generation());
                *self.inner.state.write().await = State::Authenticated(session.clone());
                debug!(generation = session.generation(), "Session created");
                Ok(session)
            }
            Err(err) => {
                warn!(error = %err, "Session creation failed");
                *self.inner.state.write().await = State::Failed(err.clone());
                Err(err)
            }
        }
    }

    #[instrument(skip(self, session), fields(generation = session.generation()))]
    async fn refresh_locked(&self, session: Session) -> Result<Session, AuthError> {
        info!("Refreshing session");

        match self.exchange_refresh(session.refresh_token()).await {
            Ok(tokens) => {
                let session = Session::new(tokens, self.next_generation());
                *self.inner.state.write().await = State::Authenticated(session.clone());
                debug!(generation = session.generation(), "Session refreshed");
                Ok(session)
            }
            Err(err) => {
                warn!(error = %err, "Session refresh failed");
                *self.inner.state.write().await = State::Failed(err.clone());
                Err(err)
            }
        }
    }

    async fn exchange_password(&self) -> Result<TokenPair, AuthError> {
        let credential = &self.inner.credential;
        if !credential.is_complete() {
            return Err(AuthError::InvalidCredentials {
                reason: "username and password are required".to_string(),
            });
        }

        let body = serde_json::to_value(CreateSessionRequest {
            identifier: credential.username(),
            password: credential.password(),
        })
        .map_err(|e| AuthError::InvalidCredentials {
            reason: e.to_string(),
        })?;

        let mut request =
            RenderedRequest::new(Method::Post, credential.base_url().endpoint(CREATE_SESSION));
        request.set_body(body);

        let response = self
            .inner
            .transport
            .send(&request, self.inner.config.primary_timeout())
            .await
            .map_err(|e| AuthError::ServiceUnavailable {
                reason: e.to_string(),
            })?;

        match response.status {
            200..=299 => {
                let tokens = parse_token_pair(&response.body)
                    .map_err(|reason| AuthError::MalformedResponse { reason })?;
                if let Some(handle) = session_handle(&response.body) {
                    debug!(%handle, "Server issued session");
                }
                Ok(tokens)
            }
            400..=499 => Err(AuthError::InvalidCredentials {
                reason: describe(&response),
            }),
            _ => Err(AuthError::ServiceUnavailable {
                reason: describe(&response),
            }),
        }
    }

    async fn exchange_refresh(&self, refresh_token: &RefreshToken) -> Result<TokenPair, AuthError> {
        let request = self.refresh_request(REFRESH_SESSION, refresh_token);

        let response = self
            .inner
            .transport
            .send(&request, self.inner.config.primary_timeout())
            .await
            .map_err(|e| AuthError::RefreshFailed {
                reason: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(AuthError::RefreshFailed {
                reason: describe(&response),
            });
        }

        parse_token_pair(&response.body).map_err(|reason| AuthError::RefreshFailed { reason })
    }

    /// A bodiless procedure authorized with the refresh token.
    fn refresh_request(&self, method: &str, refresh_token: &RefreshToken) -> RenderedRequest {
        let mut request =
            RenderedRequest::new(Method::Post, self.inner.credential.base_url().endpoint(method));
        request.remove_header("content-type");
        request.set_header(AUTHORIZATION, format!("Bearer {}", refresh_token.as_str()));
        request
    }

    fn next_generation(&self) -> u64 {
        self.inner.generations.fetch_add(1, Ordering::SeqCst) + 1
    }
}

fn describe(response: &TransportResponse) -> String {
    ProtocolError::from_body(response.status, &response.body).to_string()
}

// Custom Debug impl that hides sensitive data
impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("credential", &self.inner.credential)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use skyroute_core::BaseUrl;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    /// Transport that replays canned responses and records requests.
    #[derive(Default)]
    struct ScriptedTransport {
        responses: StdMutex<Vec<TransportResponse>>,
        seen: StdMutex<Vec<RenderedRequest>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<TransportResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: StdMutex::new(responses.into_iter().rev().collect()),
                seen: StdMutex::default(),
            })
        }

        fn seen(&self) -> Vec<RenderedRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(
            &self,
            request: &RenderedRequest,
            _timeout: Duration,
        ) -> Result<TransportResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or(TransportError::Connection {
                    message: "no scripted response".to_string(),
                })
        }
    }

    fn credential() -> Credential {
        Credential::new(BaseUrl::default(), "alice.bsky.social", "secret")
    }

    fn tokens_body(access: &str, refresh: &str) -> TransportResponse {
        TransportResponse::new(
            200,
            format!(r#"{{"accessJwt":"{}","refreshJwt":"{}"}}"#, access, refresh),
        )
    }

    #[tokio::test]
    async fn lazy_establish_on_first_use() {
        let transport = ScriptedTransport::new(vec![tokens_body("A", "R")]);
        let manager =
            SessionManager::with_transport(credential(), ClientConfig::default(), transport.clone());
        assert_eq!(manager.status().await, SessionStatus::Unauthenticated);

        let request = RenderedRequest::new(Method::Get, "https://bsky.social/xrpc/x");
        let request = manager.authenticate_request(request).await.unwrap();

        assert_eq!(request.header("authorization"), Some("Bearer A"));
        assert_eq!(manager.status().await, SessionStatus::Authenticated);
        let seen = transport.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].url(),
            "https://bsky.social/xrpc/com.atproto.server.createSession"
        );
    }

    #[tokio::test]
    async fn incomplete_credential_fails_without_network() {
        let transport = ScriptedTransport::new(vec![]);
        let manager = SessionManager::with_transport(
            Credential::without_password(BaseUrl::default(), "alice"),
            ClientConfig::default(),
            transport.clone(),
        );

        let err = manager.establish_session().await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials { .. }));
        assert!(transport.seen().is_empty());
        assert_eq!(manager.status().await, SessionStatus::Failed);
    }

    #[tokio::test]
    async fn failed_state_is_sticky_until_reset() {
        let transport = ScriptedTransport::new(vec![
            TransportResponse::new(500, Vec::new()),
            tokens_body("A", "R"),
        ]);
        let manager =
            SessionManager::with_transport(credential(), ClientConfig::default(), transport.clone());

        assert!(manager.establish_session().await.is_err());
        let again = manager.current_session().await.unwrap_err();
        assert!(matches!(again, AuthError::ServiceUnavailable { .. }));
        assert_eq!(transport.seen().len(), 1);

        manager.reset().await;
        let session = manager.current_session().await.unwrap();
        assert_eq!(session.access_token().as_str(), "A");
    }

    #[tokio::test]
    async fn late_stale_report_is_ignored() {
        let transport = ScriptedTransport::new(vec![tokens_body("A1", "R1"), tokens_body("A2", "R2")]);
        let manager =
            SessionManager::with_transport(credential(), ClientConfig::default(), transport);

        let first = manager.current_session().await.unwrap();
        let second = manager.refresh_session().await.unwrap();
        assert!(second.generation() > first.generation());

        assert!(!manager.mark_stale(first.generation()).await);
        assert_eq!(manager.status().await, SessionStatus::Authenticated);
    }

    #[tokio::test]
    async fn refresh_sends_refresh_token_without_body() {
        let transport = ScriptedTransport::new(vec![tokens_body("A2", "R2")]);
        let manager = SessionManager::restore(
            credential(),
            TokenPair::new("A1", "R1"),
            ClientConfig::default(),
            transport.clone(),
        );

        manager.refresh_session().await.unwrap();

        let seen = transport.seen();
        assert_eq!(seen[0].header("authorization"), Some("Bearer R1"));
        assert!(seen[0].body().is_none());
        assert!(seen[0].header("content-type").is_none());
        assert_eq!(manager.tokens().await, Some(TokenPair::new("A2", "R2")));
    }

    #[tokio::test]
    async fn sign_out_swallows_revocation_errors() {
        let transport = ScriptedTransport::new(vec![]);
        let manager = SessionManager::restore(
            credential(),
            TokenPair::new("A", "R"),
            ClientConfig::default(),
            transport.clone(),
        );

        manager.sign_out().await;

        assert_eq!(manager.status().await, SessionStatus::Unauthenticated);
        assert_eq!(transport.seen().len(), 1);
    }

    #[test]
    fn debug_output_is_redacted() {
        let manager = SessionManager::restore(
            credential(),
            TokenPair::new("access-secret", "refresh-secret"),
            ClientConfig::default(),
            ScriptedTransport::new(vec![]),
        );
        let debug = format!("{:?}", manager);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("alice.bsky.social"));
    }
}
