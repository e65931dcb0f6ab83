//! Outbound delivery queue
//!
//! An unbounded multi-producer channel. Producers never block; draining and
//! backpressure belong to whatever transport owns the [`DeliveryReceiver`].

use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError};

use crate::types::OutboundNotification;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Every receiver has been dropped; nothing will drain the queue.
    #[error("Delivery queue is closed")]
    Closed,
}

/// Producer side of the delivery queue
#[derive(Debug, Clone)]
pub struct DeliveryQueue {
    sender: mpsc::UnboundedSender<OutboundNotification>,
}

/// Consumer side of the delivery queue
#[derive(Debug)]
pub struct DeliveryReceiver {
    receiver: mpsc::UnboundedReceiver<OutboundNotification>,
}

impl DeliveryQueue {
    #[must_use]
    pub fn unbounded() -> (Self, DeliveryReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, DeliveryReceiver { receiver })
    }

    /// Append a notification
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] if the receiving side is gone.
    pub fn enqueue(&self, notification: OutboundNotification) -> Result<(), QueueError> {
        self.sender
            .send(notification)
            .map_err(|_| QueueError::Closed)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl DeliveryReceiver {
    /// Wait for the next notification. `None` once every producer is gone
    /// and the queue is empty.
    pub async fn recv(&mut self) -> Option<OutboundNotification> {
        self.receiver.recv().await
    }

    /// Take the next notification if one is already queued
    pub fn try_recv(&mut self) -> Option<OutboundNotification> {
        match self.receiver.try_recv() {
            Ok(notification) => Some(notification),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Take everything currently queued
    pub fn drain(&mut self) -> Vec<OutboundNotification> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}
