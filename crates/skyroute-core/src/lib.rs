//! skyroute-core - Core types for a credentialed Bluesky XRPC client.
//!
//! This crate holds everything that does not touch the network: the
//! credential and token types, the session value and its staleness rule,
//! the routing catalog that turns (resource, action, params) into a
//! [`RenderedRequest`], and the [`Transport`] trait network backends
//! implement.
//!
//! # Example
//!
//! ```
//! use skyroute_core::{BaseUrl, Params, Router};
//!
//! let router = Router::new(BaseUrl::default());
//! let request = router
//!     .render("actor", "getProfile", &Params::new().with("repo", "alice.bsky.social"))
//!     .unwrap();
//! assert_eq!(
//!     request.full_url(),
//!     "https://bsky.social/xrpc/app.bsky.actor.getProfile?actor=alice.bsky.social"
//! );
//! ```

pub mod catalog;
pub mod credentials;
pub mod error;
pub mod request;
pub mod session;
pub mod tokens;
pub mod traits;
pub mod types;

pub use catalog::{Operation, Params, Resource, Router, list_operations};
pub use credentials::Credential;
pub use error::{AuthError, Error, RoutingError};
pub use request::{Method, RenderedRequest};
pub use session::{Session, SessionStatus, is_stale};
pub use tokens::{AccessToken, RefreshToken, TokenPair};
pub use traits::{Transport, TransportResponse};
pub use types::BaseUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
