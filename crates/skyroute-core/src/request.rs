//! Rendered HTTP requests.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::form_urlencoded;

use crate::tokens::AccessToken;

/// Authorization header name, lower-cased like every stored header.
pub const AUTHORIZATION: &str = "authorization";

/// HTTP verbs used by XRPC.
///
/// XRPC queries are `GET` and procedures are `POST`; nothing else is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete request ready for a transport.
///
/// Produced per call by the router, decorated once by the session manager,
/// then consumed by the transport. Header names are stored lower-cased so
/// lookups and overwrites are case-insensitive.
#[derive(Clone, PartialEq)]
pub struct RenderedRequest {
    method: Method,
    url: String,
    headers: BTreeMap<String, String>,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl RenderedRequest {
    /// Create a request with the default JSON `Accept`/`Content-Type` headers.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        let mut request = Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            query: Vec::new(),
            body: None,
        };
        request.set_header("Accept", "application/json");
        request.set_header("Content-Type", "application/json");
        request
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// The URL without its query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The URL with the form-encoded query string appended, if any.
    pub fn full_url(&self) -> String {
        let query = self.query_string();
        if query.is_empty() {
            self.url.clone()
        } else {
            format!("{}?{}", self.url, query)
        }
    }

    /// Query pairs in declaration order.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Form-urlencoded query string, without the leading `?`.
    pub fn query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish()
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Returns a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Iterates headers as `(lower-case name, value)` pairs.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Sets a header, replacing any existing value with the same name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.remove(&name.to_ascii_lowercase());
    }

    pub fn push_query(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    pub fn set_body(&mut self, body: Value) {
        self.body = Some(body);
    }

    /// Returns the request with `Authorization: Bearer <token>` merged in.
    ///
    /// Other headers are preserved; an existing authorization header is
    /// overwritten.
    pub fn with_bearer(mut self, token: &AccessToken) -> Self {
        self.set_header(AUTHORIZATION, format!("Bearer {}", token.as_str()));
        self
    }
}

// Authorization values never reach Debug output.
impl fmt::Debug for RenderedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: BTreeMap<&str, &str> = self
            .headers
            .iter()
            .map(|(k, v)| {
                if k == AUTHORIZATION {
                    (k.as_str(), "[REDACTED]")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();

        f.debug_struct("RenderedRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("query", &self.query)
            .field("body", &self.body.as_ref().map(|_| "[JSON]"))
            .finish()
    }
}
