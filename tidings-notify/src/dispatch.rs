//! Notification fan-out
//!
//! Turns one [`NotificationEvent`] into zero or more [`OutboundNotification`]s
//! on the delivery queue.
//!
//! ## Recipient selection
//!
//! 1. **Explicit target**: the event names its recipient. Only the locality
//!    check applies; membership and the authorization policy are skipped, as
//!    whoever set the target has already authorised it.
//! 2. **Membership**: the node's membership list is looked up and every row
//!    is filtered independently through the locality check and then the
//!    authorization policy.
//!
//! No lock is held while the directory lookup is awaited, so a slow lookup
//! for one node never holds up events for other nodes.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tidings_common::{Jid, outgoing};
use tracing::{debug, trace, warn};

use crate::{
    directory::{LookupError, MembershipDirectory},
    error::DispatchError,
    model::{Membership, NodeId},
    policy::{LocalityCheck, allows},
    queue::DeliveryQueue,
    types::{NotificationEvent, OutboundNotification, Scheme},
};

/// Default upper bound on a single membership lookup
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    directory: Arc<dyn MembershipDirectory>,
    locality: LocalityCheck,
    queue: DeliveryQueue,
    lookup_timeout: Duration,
}

impl NotificationDispatcher {
    #[must_use]
    pub fn new(
        directory: Arc<dyn MembershipDirectory>,
        locality: LocalityCheck,
        queue: DeliveryQueue,
    ) -> Self {
        Self {
            directory,
            locality,
            queue,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_lookup_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    #[must_use]
    pub const fn locality(&self) -> &LocalityCheck {
        &self.locality
    }

    /// Dispatch one event, returning how many notifications were enqueued
    ///
    /// Zero is a normal outcome: the node may have no eligible local members.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::InvalidScheme`] if the event needs membership
    ///   resolution and carries a scheme with no defined rule
    /// - [`DispatchError::Lookup`] if the membership lookup fails or times out;
    ///   nothing is enqueued in that case
    /// - [`DispatchError::Queue`] if the delivery queue has been closed
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(node = %event.node, scheme = %event.scheme)
    )]
    pub async fn process(&self, event: &NotificationEvent) -> Result<usize, DispatchError> {
        if let Some(target) = &event.target {
            return self.dispatch_to_target(event, target);
        }

        if !event.scheme.is_known() {
            let scheme = u32::from(event.scheme);
            warn!(
                node = %event.node,
                scheme,
                "Refusing to dispatch event with unrecognised scheme"
            );
            return Err(DispatchError::InvalidScheme(scheme));
        }

        let started = Instant::now();

        let memberships = self.resolve_memberships(&event.node).await?;

        let mut enqueued = 0;
        for membership in memberships {
            if !self.is_eligible(&membership, event.scheme) {
                continue;
            }

            outgoing!(
                node = %event.node,
                destination = %membership.recipient,
                "Enqueueing notification"
            );
            self.queue
                .enqueue(OutboundNotification::new(&event.payload, membership.recipient))?;
            enqueued += 1;
        }

        debug!(
            node = %event.node,
            enqueued,
            elapsed_us = started.elapsed().as_micros(),
            "Dispatched notification event"
        );
        Ok(enqueued)
    }

    fn dispatch_to_target(
        &self,
        event: &NotificationEvent,
        target: &Jid,
    ) -> Result<usize, DispatchError> {
        if !self.locality.is_local(target) {
            trace!(node = %event.node, target = %target, "Explicit target is not local, skipping");
            return Ok(0);
        }

        outgoing!(
            node = %event.node,
            destination = %target,
            "Enqueueing notification for explicit target"
        );
        self.queue
            .enqueue(OutboundNotification::new(&event.payload, target.clone()))?;
        Ok(1)
    }

    async fn resolve_memberships(&self, node: &NodeId) -> Result<Vec<Membership>, LookupError> {
        let lookup = self.directory.node_memberships(node);

        let result = match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(result) => result,
            Err(_) => Err(LookupError::Timeout {
                node: node.clone(),
                after_ms: u64::try_from(self.lookup_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        };

        if let Err(e) = &result {
            warn!(node = %node, error = %e, "Membership lookup failed, no notifications sent");
        }

        result
    }

    fn is_eligible(&self, membership: &Membership, scheme: Scheme) -> bool {
        if !self.locality.is_local(&membership.recipient) {
            trace!(recipient = %membership.recipient, "Recipient is not local, skipping");
            return false;
        }

        if !allows(membership.subscription, membership.affiliation, scheme) {
            trace!(
                recipient = %membership.recipient,
                subscription = %membership.subscription,
                affiliation = %membership.affiliation,
                "Recipient not entitled to this notification"
            );
            return false;
        }

        true
    }
}
