//! Concurrent event processing
//!
//! Runs a [`NotificationDispatcher`] over a stream of inbound events, with up
//! to `max_concurrent_events` dispatches in flight at once. A failed event is
//! logged and counted; it never stops the service.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use serde::Deserialize;
use tidings_common::{DomainRegistry, LocalDomains, Signal, incoming, internal};
use tokio::{
    sync::{
        broadcast::{self, error::RecvError},
        mpsc,
    },
    task::{JoinError, JoinSet},
};
use tracing::{debug, error};

use crate::{
    directory::MembershipDirectory,
    dispatch::NotificationDispatcher,
    error::{DispatchError, ServiceError},
    policy::LocalityCheck,
    queue::DeliveryQueue,
    types::NotificationEvent,
};

const fn default_max_concurrent_events() -> usize {
    64
}

const fn default_lookup_timeout_ms() -> u64 {
    5000
}

/// Counters describing what the service has done so far
#[derive(Debug, Default)]
pub struct ServiceStats {
    events_processed: AtomicU64,
    events_failed: AtomicU64,
    notifications_enqueued: AtomicU64,
}

/// A point-in-time copy of [`ServiceStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub events_processed: u64,
    pub events_failed: u64,
    pub notifications_enqueued: u64,
}

impl ServiceStats {
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            events_processed: self.events_processed.load(Ordering::Relaxed),
            events_failed: self.events_failed.load(Ordering::Relaxed),
            notifications_enqueued: self.notifications_enqueued.load(Ordering::Relaxed),
        }
    }

    fn record(&self, outcome: Result<Result<usize, DispatchError>, JoinError>) {
        match outcome {
            Ok(Ok(enqueued)) => {
                self.events_processed.fetch_add(1, Ordering::Relaxed);
                self.notifications_enqueued.fetch_add(
                    u64::try_from(enqueued).unwrap_or(u64::MAX),
                    Ordering::Relaxed,
                );
            }
            Ok(Err(e)) => {
                self.events_failed.fetch_add(1, Ordering::Relaxed);
                error!(
                    error = %e,
                    retryable = e.is_retryable(),
                    "Failed to dispatch notification event"
                );
            }
            Err(e) => {
                self.events_failed.fetch_add(1, Ordering::Relaxed);
                error!(error = %e, "Notification dispatch task failed");
            }
        }
    }
}

/// Notification service configuration and runtime state
///
/// ```ron
/// (
///     max_concurrent_events: 128,
///     lookup_timeout_ms: 2000,
///     domains: (
///         server: "shakespeare.lit",
///         channels: "channels.shakespeare.lit",
///     ),
/// )
/// ```
#[derive(Debug, Deserialize)]
pub struct NotificationService {
    /// Maximum number of events dispatched concurrently
    #[serde(default = "default_max_concurrent_events")]
    pub max_concurrent_events: usize,

    /// Upper bound on a single membership lookup (in milliseconds)
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,

    /// Domains this server delivers to at start-up. Runtime changes go
    /// through [`NotificationService::domains`] and are not written back here.
    pub domains: LocalDomains,

    #[serde(skip)]
    registry: Option<DomainRegistry>,

    #[serde(skip)]
    dispatcher: Option<Arc<NotificationDispatcher>>,

    #[serde(skip)]
    stats: Arc<ServiceStats>,
}

impl NotificationService {
    #[must_use]
    pub fn new(domains: LocalDomains) -> Self {
        Self {
            max_concurrent_events: default_max_concurrent_events(),
            lookup_timeout_ms: default_lookup_timeout_ms(),
            domains,
            registry: None,
            dispatcher: None,
            stats: Arc::default(),
        }
    }

    /// Parse a service configuration from RON
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid service configuration.
    pub fn from_ron_str(s: &str) -> Result<Self, ServiceError> {
        ron::Options::default()
            .with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
            .from_str(s)
            .map_err(|e| ServiceError::Configuration(e.to_string()))
    }

    /// Wire the service to its membership source and delivery queue
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, or if the service has
    /// already been initialised.
    pub fn init(
        &mut self,
        directory: Arc<dyn MembershipDirectory>,
        queue: DeliveryQueue,
    ) -> Result<(), ServiceError> {
        internal!("Initialising notification service ...");

        if self.registry.is_some() {
            return Err(ServiceError::AlreadyInitialized);
        }
        if self.max_concurrent_events == 0 {
            return Err(ServiceError::Configuration(
                "max_concurrent_events must be at least 1".to_string(),
            ));
        }
        self.domains.validate()?;

        let registry = DomainRegistry::new(self.domains.clone());
        let dispatcher = NotificationDispatcher::new(
            directory,
            LocalityCheck::new(registry.clone()),
            queue,
        )
        .with_lookup_timeout(Duration::from_millis(self.lookup_timeout_ms));

        internal!(
            level = INFO,
            server = %self.domains.server,
            channels = self.domains.channels.as_deref().unwrap_or("none"),
            max_concurrent_events = self.max_concurrent_events,
            lookup_timeout_ms = self.lookup_timeout_ms,
            "Notification service ready"
        );

        self.registry = Some(registry);
        self.dispatcher = Some(Arc::new(dispatcher));

        Ok(())
    }

    /// Live domain configuration, for reconfiguration at runtime
    #[must_use]
    pub const fn domains(&self) -> Option<&DomainRegistry> {
        self.registry.as_ref()
    }

    /// The dispatcher, for callers that want to process events inline
    #[must_use]
    pub fn dispatcher(&self) -> Option<Arc<NotificationDispatcher>> {
        self.dispatcher.clone()
    }

    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Process events until shutdown is signalled or the event channel closes
    ///
    /// In-flight dispatches are allowed to finish before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the service has not been initialised.
    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn serve(
        &self,
        mut events: mpsc::Receiver<NotificationEvent>,
        mut shutdown: broadcast::Receiver<Signal>,
    ) -> Result<(), ServiceError> {
        let Some(dispatcher) = &self.dispatcher else {
            return Err(ServiceError::NotInitialized(
                "Notification service not initialized. Call init() first.".to_string(),
            ));
        };

        internal!("Notification service starting");

        let mut in_flight = JoinSet::new();

        loop {
            while in_flight.len() >= self.max_concurrent_events {
                if let Some(outcome) = in_flight.join_next().await {
                    self.stats.record(outcome);
                }
            }

            tokio::select! {
                Some(outcome) = in_flight.join_next(), if !in_flight.is_empty() => {
                    self.stats.record(outcome);
                }
                event = events.recv() => {
                    let Some(event) = event else {
                        internal!("Event channel closed, notification service stopping");
                        break;
                    };

                    incoming!(
                        node = %event.node,
                        scheme = %event.scheme,
                        "Received notification event"
                    );

                    let dispatcher = Arc::clone(dispatcher);
                    in_flight.spawn(async move { dispatcher.process(&event).await });
                }
                sig = shutdown.recv() => {
                    match sig {
                        Ok(Signal::Shutdown | Signal::Finalised) => {
                            internal!("Notification service received shutdown signal");
                            break;
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(skipped, "Shutdown channel lagged");
                        }
                        Err(RecvError::Closed) => {
                            error!("Notification service shutdown channel closed");
                            break;
                        }
                    }
                }
            }
        }

        if !in_flight.is_empty() {
            internal!("Waiting for {} in-flight event(s) to finish", in_flight.len());
        }
        while let Some(outcome) = in_flight.join_next().await {
            self.stats.record(outcome);
        }

        internal!("Notification service shutdown complete");
        Ok(())
    }
}
