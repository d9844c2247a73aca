//! Login credential type.

use std::fmt;

use crate::types::BaseUrl;

/// Username/password credential bound to one XRPC endpoint.
///
/// A credential is immutable once handed to a session manager; a different
/// password means a different credential and a fresh session.
///
/// # Security
///
/// The password is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use skyroute_core::{BaseUrl, Credential};
///
/// let cred = Credential::new(BaseUrl::default(), "alice.bsky.social", "app-password-here");
/// assert_eq!(cred.username(), "alice.bsky.social");
/// assert!(!format!("{:?}", cred).contains("app-password-here"));
/// ```
#[derive(Clone)]
pub struct Credential {
    base_url: BaseUrl,
    username: String,
    password: String,
}

impl Credential {
    /// Create a new credential.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The XRPC root to authenticate against
    /// * `username` - A handle (e.g., "alice.bsky.social"), email or DID
    /// * `password` - The account password or an app password
    pub fn new(
        base_url: BaseUrl,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url,
            username: username.into(),
            password: password.into(),
        }
    }

    /// Create a credential that can only be used with restored tokens.
    ///
    /// Establishing a session from it fails locally with
    /// [`AuthError::InvalidCredentials`](crate::error::AuthError::InvalidCredentials).
    pub fn without_password(base_url: BaseUrl, username: impl Into<String>) -> Self {
        Self::new(base_url, username, String::new())
    }

    /// Returns the XRPC root.
    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the username (handle, email or DID).
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    ///
    /// # Security
    ///
    /// Use this only when constructing the session exchange request.
    /// Never log or display this value.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns true if both username and password are present.
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
