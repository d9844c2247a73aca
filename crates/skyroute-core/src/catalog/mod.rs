//! Declarative catalog of remote operations.
//!
//! Every operation is a (resource, action) pair. Each resource has its own
//! action enum, so an action can only ever be paired with the resource it
//! belongs to, and each pair maps to exactly one static
//! [`OperationDescriptor`].

mod descriptor;
mod params;
mod render;

use std::fmt;

use crate::error::RoutingError;

pub use descriptor::{
    ComputedField, ComputedValue, DefaultValue, Location, OperationDescriptor, ParamBinding,
    ParamKind, AUTHOR_FEED_FILTERS, MAX_LIMIT, MIN_LIMIT, POST_COLLECTION,
};
pub use params::Params;
pub use render::Router;

/// Top-level resource groups, one per XRPC namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Repo,
    Feed,
    Actor,
    Graph,
    Server,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Repo,
        Resource::Feed,
        Resource::Actor,
        Resource::Graph,
        Resource::Server,
    ];

    /// Short name used on the command line, e.g. `feed`.
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Repo => "repo",
            Resource::Feed => "feed",
            Resource::Actor => "actor",
            Resource::Graph => "graph",
            Resource::Server => "server",
        }
    }

    /// XRPC namespace, e.g. `app.bsky.feed`.
    pub fn nsid_prefix(&self) -> &'static str {
        match self {
            Resource::Repo => "com.atproto.repo",
            Resource::Feed => "app.bsky.feed",
            Resource::Actor => "app.bsky.actor",
            Resource::Graph => "app.bsky.graph",
            Resource::Server => "com.atproto.server",
        }
    }

    /// Camel-case identifier, e.g. `appBskyFeed`.
    pub fn ident(&self) -> &'static str {
        match self {
            Resource::Repo => "comAtprotoRepo",
            Resource::Feed => "appBskyFeed",
            Resource::Actor => "appBskyActor",
            Resource::Graph => "appBskyGraph",
            Resource::Server => "comAtprotoServer",
        }
    }

    /// Parse a resource from its short name, namespace or identifier.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| s == r.name() || s == r.nsid_prefix() || s == r.ident())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepoAction {
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedAction {
    GetFeed,
    GetAuthorFeed,
    GetTimeline,
    GetListFeed,
    SearchPosts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorAction {
    GetProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphAction {
    GetLists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerAction {
    DeleteSession,
}

/// A routable operation: a resource tagged with one of its own actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Repo(RepoAction),
    Feed(FeedAction),
    Actor(ActorAction),
    Graph(GraphAction),
    Server(ServerAction),
}

impl Operation {
    /// The whole catalog, in a stable order.
    pub const ALL: [Operation; 9] = [
        Operation::Repo(RepoAction::Post),
        Operation::Feed(FeedAction::GetFeed),
        Operation::Feed(FeedAction::GetAuthorFeed),
        Operation::Feed(FeedAction::GetTimeline),
        Operation::Feed(FeedAction::GetListFeed),
        Operation::Feed(FeedAction::SearchPosts),
        Operation::Actor(ActorAction::GetProfile),
        Operation::Graph(GraphAction::GetLists),
        Operation::Server(ServerAction::DeleteSession),
    ];

    pub fn resource(&self) -> Resource {
        match self {
            Operation::Repo(_) => Resource::Repo,
            Operation::Feed(_) => Resource::Feed,
            Operation::Actor(_) => Resource::Actor,
            Operation::Graph(_) => Resource::Graph,
            Operation::Server(_) => Resource::Server,
        }
    }

    /// Action name, e.g. `getAuthorFeed`.
    pub fn action(&self) -> &'static str {
        match self {
            Operation::Repo(RepoAction::Post) => "post",
            Operation::Feed(FeedAction::GetFeed) => "getFeed",
            Operation::Feed(FeedAction::GetAuthorFeed) => "getAuthorFeed",
            Operation::Feed(FeedAction::GetTimeline) => "getTimeline",
            Operation::Feed(FeedAction::GetListFeed) => "getListFeed",
            Operation::Feed(FeedAction::SearchPosts) => "searchPosts",
            Operation::Actor(ActorAction::GetProfile) => "getProfile",
            Operation::Graph(GraphAction::GetLists) => "getLists",
            Operation::Server(ServerAction::DeleteSession) => "deleteSession",
        }
    }

    /// Look up an operation by resource and action name.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::UnknownOperation`] if either name is unknown
    /// or the action does not belong to the resource.
    pub fn parse(resource: &str, action: &str) -> Result<Self, RoutingError> {
        let unknown = || RoutingError::UnknownOperation {
            resource: resource.to_string(),
            action: action.to_string(),
        };

        let resource = Resource::parse(resource).ok_or_else(unknown)?;
        let action = action.trim();

        Self::ALL
            .into_iter()
            .find(|op| op.resource() == resource && op.action() == action)
            .ok_or_else(unknown)
    }

    /// The static request template for this operation.
    pub fn descriptor(&self) -> &'static OperationDescriptor {
        descriptor::lookup(*self)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource(), self.action())
    }
}

/// Enumerate every (resource, action) pair of the catalog.
pub fn list_operations() -> &'static [Operation] {
    &Operation::ALL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_accepts_all_spellings() {
        assert_eq!(Resource::parse("feed"), Some(Resource::Feed));
        assert_eq!(Resource::parse("app.bsky.feed"), Some(Resource::Feed));
        assert_eq!(Resource::parse("appBskyFeed"), Some(Resource::Feed));
        assert_eq!(Resource::parse("comAtprotoServer"), Some(Resource::Server));
        assert_eq!(Resource::parse("posts"), None);
    }

    #[test]
    fn parse_known_operation() {
        let op = Operation::parse("feed", "searchPosts").unwrap();
        assert_eq!(op, Operation::Feed(FeedAction::SearchPosts));
        assert_eq!(op.to_string(), "feed.searchPosts");
    }

    #[test]
    fn action_must_belong_to_resource() {
        let err = Operation::parse("actor", "getFeed").unwrap_err();
        assert_eq!(
            err,
            RoutingError::UnknownOperation {
                resource: "actor".to_string(),
                action: "getFeed".to_string(),
            }
        );
    }

    #[test]
    fn unknown_resource_is_unknown_operation() {
        assert!(matches!(
            Operation::parse("chat", "send"),
            Err(RoutingError::UnknownOperation { .. })
        ));
    }

    #[test]
    fn catalog_pairs_are_unique() {
        let ops = list_operations();
        assert_eq!(ops.len(), 9);
        for (i, a) in ops.iter().enumerate() {
            for b in &ops[i + 1..] {
                assert!(
                    !(a.resource() == b.resource() && a.action() == b.action()),
                    "duplicate {}",
                    a
                );
            }
        }
    }

    #[test]
    fn every_operation_round_trips_through_parse() {
        for op in list_operations() {
            assert_eq!(
                Operation::parse(op.resource().name(), op.action()).unwrap(),
                *op
            );
        }
    }
}
