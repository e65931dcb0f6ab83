//! Node membership records
//!
//! Subscription state and affiliation are independent axes. Any combination
//! can exist in the directory; only the authorization policy couples them.

use std::{
    fmt::{self, Display},
    ops::Deref,
    str::FromStr,
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tidings_common::Jid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Unknown subscription state: {0}")]
    UnknownSubscription(String),

    #[error("Unknown affiliation: {0}")]
    UnknownAffiliation(String),
}

/// Where a user is in the subscribe handshake for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subscription {
    None,
    Pending,
    Unconfigured,
    Invited,
    Subscribed,
}

impl Subscription {
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::Pending,
        Self::Unconfigured,
        Self::Invited,
        Self::Subscribed,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pending => "pending",
            Self::Unconfigured => "unconfigured",
            Self::Invited => "invited",
            Self::Subscribed => "subscribed",
        }
    }
}

impl FromStr for Subscription {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| ModelError::UnknownSubscription(s.to_string()))
    }
}

impl Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's role on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Affiliation {
    None,
    Outcast,
    Member,
    Publisher,
    Moderator,
    Owner,
}

impl Affiliation {
    pub const ALL: [Self; 6] = [
        Self::None,
        Self::Outcast,
        Self::Member,
        Self::Publisher,
        Self::Moderator,
        Self::Owner,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Outcast => "outcast",
            Self::Member => "member",
            Self::Publisher => "publisher",
            Self::Moderator => "moderator",
            Self::Owner => "owner",
        }
    }
}

impl FromStr for Affiliation {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|affiliation| affiliation.as_str() == s)
            .ok_or_else(|| ModelError::UnknownAffiliation(s.to_string()))
    }
}

impl Display for Affiliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a pubsub node, e.g. `/users/romeo@shakespeare.lit/posts`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Arc<str>);

impl NodeId {
    #[must_use]
    pub fn new(s: impl Into<Arc<str>>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for NodeId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

/// One (node, recipient) row as held by the membership directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub node: NodeId,
    pub recipient: Jid,
    pub subscription: Subscription,
    pub affiliation: Affiliation,
    /// Opaque side-channel data, carried but never interpreted here
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub extra: Option<Arc<str>>,
}

impl Membership {
    #[must_use]
    pub fn new(
        node: impl Into<NodeId>,
        recipient: Jid,
        subscription: Subscription,
        affiliation: Affiliation,
    ) -> Self {
        Self {
            node: node.into(),
            recipient,
            subscription,
            affiliation,
            extra: None,
        }
    }

    #[must_use]
    pub fn with_extra(mut self, extra: impl Into<Arc<str>>) -> Self {
        self.extra = Some(extra.into());
        self
    }
}
