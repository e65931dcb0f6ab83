//! Events coming into the engine and notifications going out of it

use std::{
    fmt::{self, Display},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tidings_common::Jid;

use crate::model::NodeId;

/// Notification visibility scheme carried on an event
///
/// Values other than 1 and 2 are kept as [`Scheme::Unknown`] so that they can
/// be rejected explicitly rather than mistaken for a known scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum Scheme {
    /// Every subscriber that is not an outcast
    #[default]
    Broadcast,
    /// Subscribed moderators and owners only
    Moderators,
    Unknown(u32),
}

impl Scheme {
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<u32> for Scheme {
    fn from(value: u32) -> Self {
        match value {
            1 => Self::Broadcast,
            2 => Self::Moderators,
            _ => Self::Unknown(value),
        }
    }
}

impl From<Scheme> for u32 {
    fn from(value: Scheme) -> Self {
        match value {
            Scheme::Broadcast => 1,
            Scheme::Moderators => 2,
            Scheme::Unknown(value) => value,
        }
    }
}

impl Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u32::from(*self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StanzaKind {
    #[default]
    Normal,
    Headline,
    Chat,
}

/// The content copied into every outbound notification
///
/// The body is shared between copies; addressing a stanza never touches it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stanza {
    pub kind: StanzaKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub from: Option<Jid>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub to: Option<Jid>,
    pub body: Arc<str>,
}

impl Stanza {
    #[must_use]
    pub fn headline(body: impl Into<Arc<str>>) -> Self {
        Self {
            kind: StanzaKind::Headline,
            body: body.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_from(mut self, from: Jid) -> Self {
        self.from = Some(from);
        self
    }

    /// A copy of this stanza with only its destination replaced
    #[must_use]
    pub fn addressed_to(&self, to: Jid) -> Self {
        Self {
            to: Some(to),
            ..self.clone()
        }
    }
}

/// One unit of inbound work for the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub node: NodeId,
    #[serde(default)]
    pub scheme: Scheme,
    /// When present, the event goes to this address alone and the node's
    /// membership is never consulted
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target: Option<Jid>,
    pub payload: Stanza,
}

impl NotificationEvent {
    #[must_use]
    pub fn new(node: impl Into<NodeId>, scheme: Scheme, payload: Stanza) -> Self {
        Self {
            node: node.into(),
            scheme,
            target: None,
            payload,
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: Jid) -> Self {
        self.target = Some(target);
        self
    }
}

/// A payload copy bound for a single recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundNotification {
    pub destination: Jid,
    pub stanza: Stanza,
}

impl OutboundNotification {
    #[must_use]
    pub fn new(payload: &Stanza, destination: Jid) -> Self {
        Self {
            stanza: payload.addressed_to(destination.clone()),
            destination,
        }
    }
}
