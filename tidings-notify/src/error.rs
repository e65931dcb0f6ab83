//! Typed error handling for notification dispatch.
//!
//! A recipient being filtered out (not subscribed, insufficient affiliation,
//! remote domain) is never an error. Errors here mean the event as a whole
//! could not be dispatched, and in every such case nothing was enqueued for
//! the membership that could not be resolved.

use thiserror::Error;

use crate::{directory::LookupError, queue::QueueError};

/// Failure to dispatch a single notification event.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The node's membership could not be resolved. Nothing was enqueued.
    #[error("Membership lookup failed: {0}")]
    Lookup(#[from] LookupError),

    /// The event carried a scheme this engine has no rule for. Nothing was enqueued.
    #[error("Unrecognised notification scheme: {0}")]
    InvalidScheme(u32),

    /// The delivery queue stopped accepting notifications mid-dispatch.
    #[error("Delivery queue error: {0}")]
    Queue(#[from] QueueError),
}

impl DispatchError {
    /// Returns `true` if dispatching the same event again could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Lookup(e) => e.is_temporary(),
            Self::InvalidScheme(_) | Self::Queue(_) => false,
        }
    }
}

/// Errors from running the notification service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// `serve` was called before `init`.
    #[error("Notification service not initialized: {0}")]
    NotInitialized(String),

    /// `init` was called a second time. The live domain registry is kept.
    #[error("Notification service is already initialized")]
    AlreadyInitialized,

    /// The service configuration is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The domain configuration is unusable.
    #[error(transparent)]
    Domains(#[from] tidings_common::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeId;

    #[test]
    fn test_retryable_classification() {
        let timeout = DispatchError::from(LookupError::Timeout {
            node: NodeId::from("/users/romeo@shakespeare.lit/posts"),
            after_ms: 5000,
        });
        assert!(timeout.is_retryable());

        assert!(!DispatchError::from(LookupError::Backend("bad row".to_string())).is_retryable());
        assert!(!DispatchError::InvalidScheme(9).is_retryable());
        assert!(!DispatchError::from(QueueError::Closed).is_retryable());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DispatchError::InvalidScheme(3).to_string(),
            "Unrecognised notification scheme: 3"
        );
        assert!(
            DispatchError::from(LookupError::Unavailable)
                .to_string()
                .contains("unavailable")
        );
    }
}
