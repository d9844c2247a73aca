//! The credentialed XRPC client.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, trace, warn};

use skyroute_core::catalog::ServerAction;
use skyroute_core::error::{Error, ProtocolError, TransportError};
use skyroute_core::{
    Credential, Operation, Params, RenderedRequest, Router, Transport, TransportResponse, is_stale,
};

use crate::config::ClientConfig;
use crate::session::{ProbeOutcome, SessionManager};

/// Routes named operations through an authenticated session.
///
/// `XrpcClient` pairs a [`Router`] with a [`SessionManager`] bound to the
/// same base URL. Every call renders locally first, so routing errors never
/// reach the network; the session is then established lazily and refreshed
/// reactively when the server reports the access token as stale.
///
/// # Example
///
/// ```no_run
/// use skyroute_core::{BaseUrl, Credential, Params};
/// use skyroute_xrpc::{ClientConfig, XrpcClient};
///
/// # async fn example() -> Result<(), skyroute_core::Error> {
/// let credential = Credential::new(BaseUrl::default(), "alice.bsky.social", "app-password");
/// let client = XrpcClient::new(credential, ClientConfig::default())?;
///
/// let profile = client
///     .execute("actor", "getProfile", &Params::new().with("repo", "alice.bsky.social"))
///     .await?;
/// println!("{}", profile["displayName"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct XrpcClient {
    router: Router,
    session: SessionManager,
}

impl XrpcClient {
    /// Create a client with the default reqwest transport.
    pub fn new(credential: Credential, config: ClientConfig) -> Result<Self, TransportError> {
        Ok(Self::from_session(SessionManager::new(credential, config)?))
    }

    /// Create a client that dispatches through a caller-supplied transport.
    pub fn with_transport(
        credential: Credential,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self::from_session(SessionManager::with_transport(credential, config, transport))
    }

    /// Wrap an existing session manager, e.g. one restored from disk.
    pub fn from_session(session: SessionManager) -> Self {
        let router = Router::new(session.credential().base_url().clone());
        Self { router, session }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Establish the session now rather than on first use.
    ///
    /// Returns the manager so callers can decorate their own requests.
    pub async fn authenticate(&self) -> Result<&SessionManager, Error> {
        self.session.current_session().await?;
        Ok(&self.session)
    }

    /// Execute an operation identified by resource and action name.
    pub async fn execute(
        &self,
        resource: &str,
        action: &str,
        params: &Params,
    ) -> Result<Value, Error> {
        let op = Operation::parse(resource, action)?;
        self.execute_operation(op, params).await
    }

    /// Execute a catalog operation and return the decoded response body.
    ///
    /// A response that marks the access token stale triggers one refresh and
    /// one replay. An empty success body decodes to `Value::Null`.
    #[instrument(skip(self, params), fields(operation = %op))]
    pub async fn execute_operation(&self, op: Operation, params: &Params) -> Result<Value, Error> {
        let request = self.router.render_operation(op, params)?;
        let value = self.execute_raw(request).await?;

        if op == Operation::Server(ServerAction::DeleteSession) {
            info!("Session deleted on server");
            self.session.reset().await;
        }

        Ok(value)
    }

    /// Authenticate and dispatch an already rendered request.
    pub async fn execute_raw(&self, request: RenderedRequest) -> Result<Value, Error> {
        if self.session.config().probe_before_request {
            self.test_connection().await?;
        }

        let response = self.dispatch(request).await?;
        response.json().map_err(|e| {
            ProtocolError::new(
                response.status,
                None,
                Some(format!("response body is not JSON: {}", e)),
            )
            .into()
        })
    }

    /// Probe the server with the current session.
    pub async fn test_connection(&self) -> Result<ProbeOutcome, Error> {
        self.session.probe().await
    }

    /// Revoke the session server-side (best effort) and forget it locally.
    pub async fn sign_out(&self) {
        self.session.sign_out().await;
    }

    async fn dispatch(&self, request: RenderedRequest) -> Result<TransportResponse, Error> {
        let timeout = self.session.config().primary_timeout();
        trace!(query = ?request.query(), has_body = request.body().is_some(), "request shape");

        let session = self.session.current_session().await?;
        let response = self
            .session
            .transport()
            .send(&session.authorize(request.clone()), timeout)
            .await?;

        if response.is_success() {
            return Ok(response);
        }
        if !is_stale(response.status, &response.body) {
            return Err(ProtocolError::from_body(response.status, &response.body).into());
        }

        debug!(status = response.status, "Access token rejected as stale");
        self.session.mark_stale(session.generation()).await;

        let session = self.session.current_session().await?;
        let response = self
            .session
            .transport()
            .send(&session.authorize(request), timeout)
            .await?;

        if response.is_success() {
            return Ok(response);
        }

        warn!(status = response.status, "Replay after refresh failed");
        if is_stale(response.status, &response.body) {
            self.session.mark_stale(session.generation()).await;
        }
        Err(ProtocolError::from_body(response.status, &response.body).into())
    }
}
