//! XRPC base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// Default XRPC root of the main Bluesky PDS.
pub const DEFAULT_BASE_URL: &str = "https://bsky.social/xrpc";

/// A validated XRPC root URL, e.g. `https://bsky.social/xrpc`.
///
/// Unlike a bare PDS host, the base URL already includes the `/xrpc`
/// prefix; method names are appended directly to it. Trailing slashes are
/// normalized away so `https://bsky.social/xrpc/` and
/// `https://bsky.social/xrpc` produce identical endpoints.
///
/// Network URLs must use HTTPS. Plain HTTP is accepted only for
/// `localhost`, `127.0.0.1` and `::1`.
///
/// # Example
///
/// ```
/// use skyroute_core::BaseUrl;
///
/// let base = BaseUrl::new("https://bsky.social/xrpc/").unwrap();
/// assert_eq!(
///     base.endpoint("com.atproto.server.createSession"),
///     "https://bsky.social/xrpc/com.atproto.server.createSession"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BaseUrl {
    url: Url,
    root: String,
}

impl BaseUrl {
    /// Create a new base URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not absolute, uses a scheme other than
    /// HTTPS (or HTTP on localhost), or has no host.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref().trim();
        let url = Url::parse(s).map_err(|e| InvalidInputError::BaseUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        if url.query().is_some() || url.fragment().is_some() {
            return Err(InvalidInputError::BaseUrl {
                value: s.to_string(),
                reason: "must not carry a query or fragment".to_string(),
            }
            .into());
        }

        // The url crate keeps a trailing slash on root paths.
        let root = url.as_str().trim_end_matches('/').to_string();

        Ok(Self { url, root })
    }

    /// Returns the absolute URL of an XRPC method or catalog path.
    ///
    /// Leading slashes on `method` are ignored, so both
    /// `app.bsky.feed.getFeed` and `/app.bsky.feed.getFeed` work.
    pub fn endpoint(&self, method: &str) -> String {
        format!("{}/{}", self.root, method.trim_start_matches('/'))
    }

    /// Returns the normalized root as a string, without trailing slash.
    pub fn as_str(&self) -> &str {
        &self.root
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::BaseUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]" || h == "::1");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(InvalidInputError::BaseUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::BaseUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl Default for BaseUrl {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL).expect("default base URL is valid")
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)
    }
}

impl FromStr for BaseUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for BaseUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.root)
    }
}

impl<'de> Deserialize<'de> for BaseUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BaseUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.root
    }
}
