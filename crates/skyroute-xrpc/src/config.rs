//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timeout for the session exchange, the probe and executed operations.
pub const DEFAULT_PRIMARY_TIMEOUT_MS: u64 = 10_000;

/// Timeout for best-effort side calls such as sign-out revocation.
pub const DEFAULT_AUXILIARY_TIMEOUT_MS: u64 = 5_000;

/// Tunables shared by the session manager and the client.
///
/// The base URL is not here: it belongs to the [`Credential`] so a token
/// pair can never be sent to a host other than the one that issued it.
///
/// [`Credential`]: skyroute_core::Credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Timeout for primary calls, in milliseconds.
    pub primary_timeout_ms: u64,
    /// Timeout for best-effort auxiliary calls, in milliseconds.
    pub auxiliary_timeout_ms: u64,
    /// Probe `getPreferences` before every executed operation.
    pub probe_before_request: bool,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn primary_timeout(&self) -> Duration {
        Duration::from_millis(self.primary_timeout_ms)
    }

    pub fn auxiliary_timeout(&self) -> Duration {
        Duration::from_millis(self.auxiliary_timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            primary_timeout_ms: DEFAULT_PRIMARY_TIMEOUT_MS,
            auxiliary_timeout_ms: DEFAULT_AUXILIARY_TIMEOUT_MS,
            probe_before_request: false,
            user_agent: concat!("skyroute/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
