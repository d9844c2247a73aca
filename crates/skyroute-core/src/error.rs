//! Error types for skyroute.
//!
//! This module provides a unified error type with explicit variants for
//! authentication, routing, transport, protocol, and input validation errors.
//! None of the variants carry credentials or tokens, so every error is safe
//! to log or report.

use std::fmt;
use thiserror::Error;

/// The unified error type for skyroute operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Session establishment or refresh failed.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The requested operation could not be rendered into a request.
    #[error("routing error: {0}")]
    Routing(#[from] RoutingError),

    /// Network transport errors (connection, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a non-success XRPC response.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (base URL, parameter names).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Authentication-related errors.
///
/// These are cloneable so a failed session can keep reporting the failure
/// that put it into the terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The username/password pair was rejected (HTTP 4xx) or is incomplete.
    #[error("invalid credentials: {reason}")]
    InvalidCredentials { reason: String },

    /// The server failed (HTTP 5xx) or could not be reached.
    #[error("service unavailable: {reason}")]
    ServiceUnavailable { reason: String },

    /// The exchange succeeded but the token pair could not be read.
    #[error("malformed session response: {reason}")]
    MalformedResponse { reason: String },

    /// The refresh token could not be exchanged for a new pair.
    #[error("session refresh failed: {reason}")]
    RefreshFailed { reason: String },
}

/// Local validation failures raised while rendering an operation.
///
/// Routing errors are produced before any network traffic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// No descriptor matches the (resource, action) pair.
    #[error("unknown operation '{resource}.{action}'")]
    UnknownOperation { resource: String, action: String },

    /// A required parameter has no value and no default.
    #[error("missing required parameter '{0}'")]
    MissingParameter(String),

    /// A numeric parameter falls outside its declared range.
    #[error("parameter '{name}' is {value}, expected {min}..={max}")]
    OutOfRange {
        name: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// A parameter value has the wrong shape for its declared kind.
    #[error("invalid value for parameter '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },

    /// The HTTP client could not be constructed.
    #[error("client setup failed: {message}")]
    Client { message: String },
}

/// Protocol-level errors from XRPC responses.
#[derive(Debug, Clone)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// XRPC error code (if present).
    pub error: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// Build a protocol error from a raw response body.
    ///
    /// Bodies that are not in the XRPC error format yield a bare status.
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(value) => Self::new(
                status,
                value["error"].as_str().map(str::to_string),
                value["message"].as_str().map(str::to_string),
            ),
            Err(_) => Self::new(status, None, None),
        }
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid base URL.
    #[error("invalid base URL '{value}': {reason}")]
    BaseUrl { value: String, reason: String },

    /// A `name=value` parameter could not be parsed.
    #[error("invalid parameter '{value}': {reason}")]
    Param { value: String, reason: String },
}
