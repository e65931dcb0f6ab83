//! Notification fan-out and access control for pubsub nodes
//!
//! This crate decides, for every member of a node, whether a published
//! notification should reach them, and places one addressed copy per
//! entitled recipient on the delivery queue:
//! - Membership lookup through an injected [`MembershipDirectory`]
//! - Locality filtering against the live [`LocalDomains`](tidings_common::LocalDomains)
//! - The subscription/affiliation/scheme authorization policy
//! - Concurrent processing of inbound events via [`NotificationService`]

mod directory;
mod dispatch;
mod error;
pub mod model;
pub mod policy;
mod queue;
mod service;
mod types;

pub use directory::{LookupError, MembershipDirectory, MemoryDirectory};
pub use dispatch::{DEFAULT_LOOKUP_TIMEOUT, NotificationDispatcher};
pub use error::{DispatchError, ServiceError};
pub use model::{Affiliation, Membership, ModelError, NodeId, Subscription};
pub use policy::{LocalityCheck, allows};
pub use queue::{DeliveryQueue, DeliveryReceiver, QueueError};
pub use service::{NotificationService, ServiceStats, StatsSnapshot};
pub use types::{NotificationEvent, OutboundNotification, Scheme, Stanza, StanzaKind};
