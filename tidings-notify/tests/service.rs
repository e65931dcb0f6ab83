//! Notification service lifecycle and concurrent dispatch

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tidings_common::{LocalDomains, Signal};
use tidings_notify::{
    Affiliation, DeliveryQueue, LookupError, Membership, MembershipDirectory, MemoryDirectory,
    NodeId, NotificationEvent, NotificationService, Scheme, Stanza, StatsSnapshot, Subscription,
};
use tokio::sync::{Notify, broadcast, mpsc};

fn posts(owner: &str) -> String {
    format!("/users/{owner}@shakespeare.lit/posts")
}

fn member(node: &str, who: &str) -> Membership {
    Membership::new(
        node,
        format!("{who}@shakespeare.lit").parse().unwrap(),
        Subscription::Subscribed,
        Affiliation::Member,
    )
}

fn event(node: &str, scheme: Scheme) -> NotificationEvent {
    NotificationEvent::new(node, scheme, Stanza::headline("<items/>"))
}

/// Holds every lookup until released, counting how many are waiting
#[derive(Debug)]
struct GatedDirectory {
    inner: MemoryDirectory,
    waiting: AtomicUsize,
    release: Notify,
}

#[async_trait]
impl MembershipDirectory for GatedDirectory {
    async fn node_memberships(&self, node: &NodeId) -> Result<Vec<Membership>, LookupError> {
        let released = self.release.notified();
        self.waiting.fetch_add(1, Ordering::SeqCst);
        released.await;
        self.inner.node_memberships(node).await
    }
}

#[tokio::test]
async fn serves_events_until_channel_closes() {
    let directory = MemoryDirectory::new();
    let romeo = posts("romeo");
    let juliet = posts("juliet");
    directory.set_memberships(
        romeo.as_str(),
        vec![member(&romeo, "juliet"), member(&romeo, "mercutio")],
    );
    directory.set_memberships(juliet.as_str(), vec![member(&juliet, "romeo")]);

    let (queue, mut receiver) = DeliveryQueue::unbounded();
    let mut service = NotificationService::new(LocalDomains::new("shakespeare.lit"));
    service.init(Arc::new(directory), queue).unwrap();

    let (events_tx, events) = mpsc::channel(16);
    let (_shutdown_tx, shutdown) = broadcast::channel(1);

    events_tx.send(event(&romeo, Scheme::Broadcast)).await.unwrap();
    events_tx.send(event(&juliet, Scheme::Broadcast)).await.unwrap();
    events_tx.send(event(&juliet, Scheme::Unknown(9))).await.unwrap();
    drop(events_tx);

    service.serve(events, shutdown).await.unwrap();

    assert_eq!(receiver.drain().len(), 3);
    assert_eq!(
        service.stats(),
        StatsSnapshot {
            events_processed: 2,
            events_failed: 1,
            notifications_enqueued: 3,
        }
    );
}

#[tokio::test]
async fn slow_lookups_run_concurrently() {
    let inner = MemoryDirectory::new();
    let nodes: Vec<String> = ["romeo", "juliet", "tybalt"].into_iter().map(posts).collect();
    for node in &nodes {
        inner.insert(member(node, "nurse"));
    }
    let directory = Arc::new(GatedDirectory {
        inner,
        waiting: AtomicUsize::new(0),
        release: Notify::new(),
    });

    let (queue, mut receiver) = DeliveryQueue::unbounded();
    let mut service = NotificationService::new(LocalDomains::new("shakespeare.lit"));
    service.max_concurrent_events = 8;
    service.init(directory.clone(), queue).unwrap();

    let (events_tx, events) = mpsc::channel(16);
    let (_shutdown_tx, shutdown) = broadcast::channel(1);
    for node in &nodes {
        events_tx.send(event(node, Scheme::Broadcast)).await.unwrap();
    }
    drop(events_tx);

    let release = async {
        // All three lookups are suspended at the same time
        tokio::time::timeout(Duration::from_secs(5), async {
            while directory.waiting.load(Ordering::SeqCst) < nodes.len() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("lookups should be in flight together");
        directory.release.notify_waiters();
    };

    let (served, ()) = tokio::join!(service.serve(events, shutdown), release);
    served.unwrap();

    assert_eq!(receiver.drain().len(), nodes.len());
    assert_eq!(service.stats().events_processed, 3);
}

#[tokio::test]
async fn shutdown_signal_stops_the_service() {
    let (queue, _receiver) = DeliveryQueue::unbounded();
    let mut service = NotificationService::new(LocalDomains::new("shakespeare.lit"));
    service.init(Arc::new(MemoryDirectory::new()), queue).unwrap();

    let (_events_tx, events) = mpsc::channel::<NotificationEvent>(1);
    let (shutdown_tx, shutdown) = broadcast::channel(1);
    shutdown_tx.send(Signal::Shutdown).unwrap();

    tokio::time::timeout(Duration::from_secs(5), service.serve(events, shutdown))
        .await
        .expect("service should stop on shutdown")
        .unwrap();

    assert_eq!(service.stats(), StatsSnapshot::default());
}

#[tokio::test]
async fn runtime_reconfiguration_applies_to_later_events() {
    let node = posts("romeo");
    let directory = MemoryDirectory::new();
    directory.insert(member(&node, "juliet"));

    let (queue, mut receiver) = DeliveryQueue::unbounded();
    let mut service = NotificationService::new(LocalDomains::new("shakespeare.lit"));
    service.init(Arc::new(directory), queue).unwrap();

    let dispatcher = service.dispatcher().unwrap();
    assert_eq!(dispatcher.process(&event(&node, Scheme::Broadcast)).await.unwrap(), 1);

    service.domains().unwrap().set_server("denmark.lit").unwrap();
    assert_eq!(dispatcher.process(&event(&node, Scheme::Broadcast)).await.unwrap(), 0);

    assert_eq!(receiver.drain().len(), 1);
}
