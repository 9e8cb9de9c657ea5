//! Fan-out of "inventory changed" signals to open push connections.
//!
//! Each subscriber owns an unbounded channel and a heartbeat task that emits
//! [`Signal::KeepAlive`] at a fixed interval so intermediaries keep the connection open.
//! The signal carries no content: subscribers are expected to re-fetch the full item list.

use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;

pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Inventory data changed; re-fetch.
    Update,
    KeepAlive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

struct Subscriber {
    id: SubscriberId,
    sender: UnboundedSender<Signal>,
    heartbeat: JoinHandle<()>,
}

impl Drop for Subscriber {
    fn drop(&mut self) {
        self.heartbeat.abort();
    }
}

struct Registry {
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: AtomicU64,
    keep_alive: Duration,
}

impl Registry {
    fn lock(&self) -> MutexGuard<'_, Vec<Subscriber>> {
        // Entries stay consistent even if a holder panicked; keep serving.
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.lock();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        before != subscribers.len()
    }
}

/// Registry of open push subscribers, owned by the HTTP server state.
#[derive(Clone)]
pub struct ChangeNotifier {
    inner: Arc<Registry>,
}

impl ChangeNotifier {
    pub fn new(keep_alive: Duration) -> Self {
        Self {
            inner: Arc::new(Registry {
                subscribers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                keep_alive,
            }),
        }
    }

    /// Registers a new subscriber and starts its heartbeat.
    ///
    /// Must be called from within a tokio runtime. Dropping the returned [`Subscription`]
    /// unsubscribes it.
    pub fn subscribe(&self) -> Subscription {
        let id = SubscriberId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = unbounded_channel();
        let heartbeat = spawn_heartbeat(sender.clone(), self.inner.keep_alive);

        let mut subscribers = self.inner.lock();
        subscribers.push(Subscriber {
            id,
            sender,
            heartbeat,
        });
        tracing::debug!(subscriber = id.0, total = subscribers.len(), "push subscriber added");

        Subscription {
            id,
            receiver: UnboundedReceiverStream::new(receiver),
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Stops the heartbeat and forgets the subscriber. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.inner.remove(id);
        if removed {
            tracing::debug!(subscriber = id.0, "push subscriber removed");
        }
        removed
    }

    /// Sends one [`Signal::Update`] to every subscriber without waiting on any of them.
    ///
    /// Subscribers whose receiving side is gone are dropped from the registry. Returns the
    /// number of subscribers the signal was written to.
    pub fn broadcast(&self) -> usize {
        let mut subscribers = self.inner.lock();
        let mut delivered = 0;
        subscribers.retain(|s| match s.sender.send(Signal::Update) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(_) => false,
        });
        tracing::debug!(delivered, "inventory_update broadcast");
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().len()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_KEEP_ALIVE)
    }
}

fn spawn_heartbeat(sender: UnboundedSender<Signal>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if sender.send(Signal::KeepAlive).is_err() {
                break;
            }
        }
    })
}

/// Receiving side of one push connection.
pub struct Subscription {
    id: SubscriberId,
    receiver: UnboundedReceiverStream<Signal>,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }
}

impl Stream for Subscription {
    type Item = Signal;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Signal>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if registry.remove(self.id) {
                tracing::debug!(subscriber = self.id.0, "push subscriber disconnected");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn broadcast_reaches_every_subscriber_once() {
        let notifier = ChangeNotifier::default();
        let mut first = notifier.subscribe();
        let mut second = notifier.subscribe();

        assert_eq!(notifier.broadcast(), 2);
        assert_eq!(first.next().await, Some(Signal::Update));
        assert_eq!(second.next().await, Some(Signal::Update));
    }

    #[tokio::test]
    async fn broadcast_without_subscribers_is_dropped() {
        let notifier = ChangeNotifier::default();
        assert_eq!(notifier.broadcast(), 0);
    }

    #[tokio::test]
    async fn dropped_subscription_is_removed_before_next_broadcast() {
        let notifier = ChangeNotifier::default();
        let subscription = notifier.subscribe();
        let id = subscription.id();
        assert_eq!(notifier.subscriber_count(), 1);

        drop(subscription);
        assert_eq!(notifier.subscriber_count(), 0);
        assert_eq!(notifier.broadcast(), 0);
        assert_eq!(notifier.broadcast(), 0);
        assert!(!notifier.unsubscribe(id));
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent() {
        let notifier = ChangeNotifier::default();
        let mut subscription = notifier.subscribe();

        assert!(notifier.unsubscribe(subscription.id()));
        assert!(!notifier.unsubscribe(subscription.id()));
        assert_eq!(notifier.broadcast(), 0);

        // Heartbeat and registry entry are gone, so the channel closes.
        assert_eq!(subscription.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn update_arrives_before_the_next_keep_alive() {
        let notifier = ChangeNotifier::new(Duration::from_secs(20));
        let mut subscription = notifier.subscribe();

        notifier.broadcast();
        assert_eq!(subscription.next().await, Some(Signal::Update));

        let started = tokio::time::Instant::now();
        assert_eq!(subscription.next().await, Some(Signal::KeepAlive));
        assert!(started.elapsed() >= Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeat_stops_after_unsubscribe() {
        let notifier = ChangeNotifier::new(Duration::from_secs(1));
        let mut subscription = notifier.subscribe();
        assert_eq!(subscription.next().await, Some(Signal::KeepAlive));

        notifier.unsubscribe(subscription.id());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(subscription.next().await, None);
    }
}
