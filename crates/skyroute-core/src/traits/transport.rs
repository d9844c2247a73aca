//! Transport trait.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::request::RenderedRequest;

/// Raw answer from a transport: status and unparsed body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parses the body as JSON. An empty body is `Value::Null`.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&self.body)
    }
}

/// Dispatches rendered requests.
///
/// The session manager and client never talk to the network directly; a
/// host can plug in its own HTTP stack by implementing this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request, giving up after `timeout`.
    ///
    /// Non-success HTTP statuses are returned as responses, not errors;
    /// only failures to obtain a response are `TransportError`s.
    async fn send(
        &self,
        request: &RenderedRequest,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_parses_as_null() {
        let response = TransportResponse::new(200, Vec::new());
        assert_eq!(response.json().unwrap(), Value::Null);
        assert!(response.is_success());
    }

    #[test]
    fn status_classes() {
        assert!(!TransportResponse::new(400, b"{}".to_vec()).is_success());
        assert!(TransportResponse::new(204, b"".to_vec()).is_success());
    }
}
