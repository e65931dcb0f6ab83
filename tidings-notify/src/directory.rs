//! Membership lookup
//!
//! The dispatcher only ever reads from the directory. Storage-backed
//! implementations live with the server; [`MemoryDirectory`] is provided for
//! embedding and tests.

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

use crate::model::{Membership, NodeId};

/// Errors from a membership lookup.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// The storage backend reported a failure.
    #[error("Membership backend error: {0}")]
    Backend(String),

    /// The lookup did not complete in time.
    #[error("Membership lookup for {node} timed out after {after_ms} ms")]
    Timeout { node: NodeId, after_ms: u64 },

    /// The directory cannot serve lookups at the moment.
    #[error("Membership directory unavailable")]
    Unavailable,
}

impl LookupError {
    /// Returns `true` if the same lookup could succeed on a later attempt.
    #[must_use]
    pub const fn is_temporary(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unavailable)
    }
}

/// Source of node membership lists
#[async_trait]
pub trait MembershipDirectory: Send + Sync + Debug {
    /// All membership rows for `node`, in no particular order
    ///
    /// An unknown node yields an empty list rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be queried.
    async fn node_memberships(&self, node: &NodeId) -> Result<Vec<Membership>, LookupError>;
}

/// In-memory membership directory
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    nodes: Arc<DashMap<NodeId, Vec<Membership>>>,
}

impl MemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row under its own node. Existing rows are kept.
    pub fn insert(&self, membership: Membership) {
        self.nodes
            .entry(membership.node.clone())
            .or_default()
            .push(membership);
    }

    /// Replace every row for `node`
    pub fn set_memberships(&self, node: impl Into<NodeId>, memberships: Vec<Membership>) {
        self.nodes.insert(node.into(), memberships);
    }

    pub fn remove_node(&self, node: &NodeId) -> Option<Vec<Membership>> {
        self.nodes.remove(node).map(|(_, rows)| rows)
    }

    /// Number of nodes with at least one stored row list
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[async_trait]
impl MembershipDirectory for MemoryDirectory {
    async fn node_memberships(&self, node: &NodeId) -> Result<Vec<Membership>, LookupError> {
        Ok(self
            .nodes
            .get(node)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}
