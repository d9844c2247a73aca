//! Static request templates.

use crate::request::Method;

use super::{ActorAction, FeedAction, GraphAction, Operation, RepoAction, ServerAction};

/// Collection written by the post operation.
pub const POST_COLLECTION: &str = "app.bsky.feed.post";

/// Page-size bounds accepted by every paginated Bluesky query.
pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 100;

/// Values accepted by `app.bsky.feed.getAuthorFeed`'s `filter`.
pub const AUTHOR_FEED_FILTERS: &[&str] = &[
    "posts_with_replies",
    "posts_no_replies",
    "posts_with_media",
    "posts_and_author_threads",
];

/// Request template for one operation.
#[derive(Debug)]
pub struct OperationDescriptor {
    pub method: Method,
    /// Path relative to the base URL; `{name}` marks a path parameter.
    pub path: &'static str,
    pub params: &'static [ParamBinding],
    /// Body fields filled in by the renderer rather than the caller.
    pub computed: &'static [ComputedField],
}

impl OperationDescriptor {
    /// Returns the binding for a declared parameter name.
    pub fn param(&self, name: &str) -> Option<&'static ParamBinding> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Returns true if the rendered request carries a JSON body.
    pub fn has_body(&self) -> bool {
        !self.computed.is_empty()
            || self
                .params
                .iter()
                .any(|p| matches!(p.location, Location::Body(_)))
    }
}

/// How one caller-facing parameter lands in the request.
#[derive(Debug)]
pub struct ParamBinding {
    /// Name the caller supplies the value under.
    pub name: &'static str,
    pub location: Location,
    pub required: bool,
    pub default: Option<DefaultValue>,
    pub kind: ParamKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Query-string key.
    Query(&'static str),
    /// Path of keys into the JSON body.
    Body(&'static [&'static str]),
    /// Placeholder in the path template, without braces.
    Path(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Text,
    Integer { min: i64, max: i64 },
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Integer(i64),
    Text(&'static str),
}

#[derive(Debug)]
pub struct ComputedField {
    pub path: &'static [&'static str],
    pub value: ComputedValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputedValue {
    Constant(&'static str),
    /// Render time as an RFC 3339 UTC timestamp.
    Now,
}

const fn required_query(name: &'static str, key: &'static str) -> ParamBinding {
    ParamBinding {
        name,
        location: Location::Query(key),
        required: true,
        default: None,
        kind: ParamKind::Text,
    }
}

const fn limit(default: i64) -> ParamBinding {
    ParamBinding {
        name: "limit",
        location: Location::Query("limit"),
        required: false,
        default: Some(DefaultValue::Integer(default)),
        kind: ParamKind::Integer {
            min: MIN_LIMIT,
            max: MAX_LIMIT,
        },
    }
}

const CURSOR: ParamBinding = ParamBinding {
    name: "cursor",
    location: Location::Query("cursor"),
    required: false,
    default: None,
    kind: ParamKind::Text,
};

static POST: OperationDescriptor = OperationDescriptor {
    method: Method::Post,
    path: "/com.atproto.repo.createRecord",
    params: &[
        ParamBinding {
            name: "repo",
            location: Location::Body(&["repo"]),
            required: true,
            default: None,
            kind: ParamKind::Text,
        },
        ParamBinding {
            name: "text",
            location: Location::Body(&["record", "text"]),
            required: true,
            default: None,
            kind: ParamKind::Text,
        },
    ],
    computed: &[
        ComputedField {
            path: &["collection"],
            value: ComputedValue::Constant(POST_COLLECTION),
        },
        ComputedField {
            path: &["record", "createdAt"],
            value: ComputedValue::Now,
        },
    ],
};

static GET_FEED: OperationDescriptor = OperationDescriptor {
    method: Method::Get,
    path: "/app.bsky.feed.getFeed",
    params: &[required_query("feed", "feed"), limit(50), CURSOR],
    computed: &[],
};

static GET_AUTHOR_FEED: OperationDescriptor = OperationDescriptor {
    method: Method::Get,
    path: "/app.bsky.feed.getAuthorFeed",
    params: &[
        required_query("actor", "actor"),
        limit(50),
        CURSOR,
        ParamBinding {
            name: "filter",
            location: Location::Query("filter"),
            required: false,
            default: Some(DefaultValue::Text("posts_with_replies")),
            kind: ParamKind::Choice(AUTHOR_FEED_FILTERS),
        },
    ],
    computed: &[],
};

static GET_TIMELINE: OperationDescriptor = OperationDescriptor {
    method: Method::Get,
    path: "/app.bsky.feed.getTimeline",
    params: &[limit(50), CURSOR],
    computed: &[],
};

static GET_LIST_FEED: OperationDescriptor = OperationDescriptor {
    method: Method::Get,
    path: "/app.bsky.feed.getListFeed",
    params: &[required_query("list", "list"), limit(50), CURSOR],
    computed: &[],
};

static SEARCH_POSTS: OperationDescriptor = OperationDescriptor {
    method: Method::Get,
    path: "/app.bsky.feed.searchPosts",
    params: &[required_query("query", "q"), limit(25), CURSOR],
    computed: &[],
};

static GET_PROFILE: OperationDescriptor = OperationDescriptor {
    method: Method::Get,
    path: "/app.bsky.actor.getProfile",
    params: &[required_query("repo", "actor")],
    computed: &[],
};

static GET_LISTS: OperationDescriptor = OperationDescriptor {
    method: Method::Get,
    path: "/app.bsky.graph.getLists",
    params: &[required_query("repo", "actor"), limit(50), CURSOR],
    computed: &[],
};

static DELETE_SESSION: OperationDescriptor = OperationDescriptor {
    method: Method::Post,
    path: "/com.atproto.server.deleteSession",
    params: &[],
    computed: &[],
};

pub(super) fn lookup(op: Operation) -> &'static OperationDescriptor {
    match op {
        Operation::Repo(RepoAction::Post) => &POST,
        Operation::Feed(FeedAction::GetFeed) => &GET_FEED,
        Operation::Feed(FeedAction::GetAuthorFeed) => &GET_AUTHOR_FEED,
        Operation::Feed(FeedAction::GetTimeline) => &GET_TIMELINE,
        Operation::Feed(FeedAction::GetListFeed) => &GET_LIST_FEED,
        Operation::Feed(FeedAction::SearchPosts) => &SEARCH_POSTS,
        Operation::Actor(ActorAction::GetProfile) => &GET_PROFILE,
        Operation::Graph(GraphAction::GetLists) => &GET_LISTS,
        Operation::Server(ServerAction::DeleteSession) => &DELETE_SESSION,
    }
}
