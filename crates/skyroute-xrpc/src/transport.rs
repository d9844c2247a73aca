//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, trace};

use skyroute_core::error::TransportError;
use skyroute_core::{Method, RenderedRequest, Transport, TransportResponse};

/// HTTP transport for XRPC requests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the given user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(user_agent: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransportError::Client {
                message: e.to_string(),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    async fn send(
        &self,
        request: &RenderedRequest,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        debug!("XRPC request");

        let method = match request.method() {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = self
            .client
            .request(method, request.full_url())
            .timeout(timeout);

        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }

        if let Some(body) = request.body() {
            let bytes = serde_json::to_vec(body).map_err(|e| TransportError::Http {
                message: e.to_string(),
            })?;
            builder = builder.body(bytes);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        trace!(status, bytes = body.len(), "XRPC response");
        Ok(TransportResponse::new(status, body.to_vec()))
    }
}

fn transport_error(err: reqwest::Error, timeout: Duration) -> TransportError {
    // Strip the URL so query parameters never end up in error text.
    let err = err.without_url();
    if err.is_timeout() {
        TransportError::Timeout {
            duration_ms: millis(timeout),
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
