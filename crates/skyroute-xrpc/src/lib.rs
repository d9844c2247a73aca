//! skyroute-xrpc - Network side of the skyroute Bluesky client.
//!
//! Provides the reqwest-backed [`HttpTransport`], the [`SessionManager`]
//! that owns the token lifecycle, and the [`XrpcClient`] facade that routes
//! named operations through it.
//!
//! # Quick Start
//!
//! ```no_run
//! use skyroute_core::{BaseUrl, Credential, Params};
//! use skyroute_xrpc::{ClientConfig, XrpcClient};
//!
//! # async fn example() -> Result<(), skyroute_core::Error> {
//! let credential = Credential::new(BaseUrl::default(), "alice.bsky.social", "app-password");
//! let client = XrpcClient::new(credential, ClientConfig::default())?;
//!
//! let timeline = client.execute("feed", "getTimeline", &Params::new()).await?;
//! println!("{}", timeline["feed"]);
//! # Ok(())
//! # }
//! ```
//!
//! # Security
//!
//! Passwords and tokens never appear in `Debug` output, log fields or error
//! values.

pub mod client;
pub mod config;
mod endpoints;
pub mod session;
pub mod transport;

pub use client::XrpcClient;
pub use config::ClientConfig;
pub use session::{ProbeOutcome, SessionManager};
pub use transport::HttpTransport;
