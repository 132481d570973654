//! Topic-addressed, in-process publish/subscribe bus.
//!
//! Realizes spec §4.1: publishing is non-blocking from the publisher's point
//! of view (a full subscriber queue drops its oldest entry rather than
//! blocking or failing), subscriptions are independent buffered channels that
//! self-remove when dropped, and per-subscriber delivery preserves publish
//! order. Payloads are type-erased (`Arc<dyn Any + Send + Sync>`) so this
//! crate carries no dependency on any message type defined further up the
//! pipeline; subscribers downcast with [`Subscription::recv_as`].

use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Default per-subscriber queue capacity, per spec §4.1.
pub const DEFAULT_CAPACITY: usize = 1000;

/// A type-erased message delivered through the bus.
pub type BusMessage = Arc<dyn Any + Send + Sync>;

struct Channel {
    queue: Mutex<VecDeque<BusMessage>>,
    notify: Notify,
    closed: AtomicBool,
    capacity: usize,
}

impl Channel {
    fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            notify: Notify::new(),
            closed: AtomicBool::new(false),
            capacity,
        })
    }

    /// Push a message, dropping the oldest queued message if full. Never
    /// blocks and never fails, matching spec §4.1's publisher contract.
    fn push(&self, message: BusMessage) {
        let mut queue = self.queue.lock();
        if queue.len() >= self.capacity {
            queue.pop_front();
        }
        queue.push_back(message);
        drop(queue);
        self.notify.notify_one();
    }

    async fn recv(&self) -> Option<BusMessage> {
        loop {
            // Register interest before checking the predicate so a push
            // racing with the check is not missed (Notify's single stored
            // permit makes this race-free).
            let notified = self.notify.notified();
            {
                let mut queue = self.queue.lock();
                if let Some(message) = queue.pop_front() {
                    return Some(message);
                }
                if self.closed.load(Ordering::Acquire) {
                    return None;
                }
            }
            notified.await;
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }
}

struct Slot {
    id: u64,
    channel: Arc<Channel>,
}

#[derive(Default)]
struct Topics {
    by_name: HashMap<String, Vec<Slot>>,
}

struct Inner {
    topics: Mutex<Topics>,
    next_id: AtomicU64,
}

/// A topic-addressed in-process publish/subscribe bus.
///
/// Cheaply cloneable; clones share the same subscriber sets (spec §4.1:
/// "the subscriber-set of each topic is protected by a single lock").
#[derive(Clone)]
pub struct Bus {
    inner: Arc<Inner>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                topics: Mutex::new(Topics::default()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Deliver `message` to every current subscriber of `topic`.
    ///
    /// Takes a snapshot of the subscriber list under the topic lock, then
    /// enqueues into each subscriber's channel outside the lock, so a slow
    /// subscriber cannot block other publishers (spec §4.1's concurrency
    /// discipline).
    pub fn publish<T: Any + Send + Sync>(&self, topic: &str, message: T) {
        let message: BusMessage = Arc::new(message);
        let snapshot: Vec<Arc<Channel>> = {
            let topics = self.inner.topics.lock();
            match topics.by_name.get(topic) {
                Some(slots) => slots.iter().map(|s| s.channel.clone()).collect(),
                None => return,
            }
        };
        for channel in snapshot {
            channel.push(message.clone());
        }
    }

    /// Subscribe to `topic` with the default capacity (1000, per spec §4.1).
    pub fn subscribe(&self, topic: &str) -> Subscription {
        self.subscribe_with_capacity(topic, DEFAULT_CAPACITY)
    }

    /// Subscribe to `topic` with an explicit buffer capacity. Each call
    /// produces an independent channel (spec §4.1).
    pub fn subscribe_with_capacity(&self, topic: &str, capacity: usize) -> Subscription {
        let channel = Channel::new(capacity);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        let mut topics = self.inner.topics.lock();
        topics
            .by_name
            .entry(topic.to_string())
            .or_default()
            .push(Slot {
                id,
                channel: channel.clone(),
            });

        Subscription {
            id,
            topic: topic.to_string(),
            channel,
            inner: self.inner.clone(),
        }
    }

    /// Discard every subscriber set. In-flight consumers observe
    /// end-of-stream; the primitive itself has no further state.
    pub fn shutdown(&self) {
        let mut topics = self.inner.topics.lock();
        for slots in topics.by_name.values() {
            for slot in slots {
                slot.channel.close();
            }
        }
        topics.by_name.clear();
    }
}

/// A live subscription to one topic.
///
/// Dropping a `Subscription` removes it from the topic's subscriber set
/// (spec §4.1: "the subscription is self-cleaning").
pub struct Subscription {
    id: u64,
    topic: String,
    channel: Arc<Channel>,
    inner: Arc<Inner>,
}

impl Subscription {
    /// Receive the next message, or `None` once the bus has shut down.
    pub async fn recv(&mut self) -> Option<BusMessage> {
        self.channel.recv().await
    }

    /// Receive the next message and downcast it to `T`.
    ///
    /// Returns `None` on end-of-stream. Panics if a message of an unexpected
    /// type arrives on this topic, which indicates a programming error (two
    /// publishers disagreeing on a topic's payload type) rather than a
    /// recoverable runtime condition.
    pub async fn recv_as<T: Any + Send + Sync + Clone>(&mut self) -> Option<T> {
        let message = self.recv().await?;
        Some(
            message
                .downcast_ref::<T>()
                .unwrap_or_else(|| {
                    panic!(
                        "bus topic '{}' received unexpected message type",
                        self.topic
                    )
                })
                .clone(),
        )
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut topics = self.inner.topics.lock();
        if let Some(slots) = topics.by_name.get_mut(&self.topic) {
            slots.retain(|s| s.id != self.id);
            if slots.is_empty() {
                topics.by_name.remove(&self.topic);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn publish_before_subscribe_is_lost() {
        let bus = Bus::new();
        bus.publish("topic", 1i32);
        let mut sub = bus.subscribe("topic");
        bus.publish("topic", 2i32);
        assert_eq!(sub.recv_as::<i32>().await, Some(2));
    }

    #[tokio::test]
    async fn per_subscriber_fifo_ordering() {
        let bus = Bus::new();
        let mut sub = bus.subscribe("topic");
        for i in 0..50 {
            bus.publish("topic", i);
        }
        for i in 0..50 {
            assert_eq!(sub.recv_as::<i32>().await, Some(i));
        }
    }

    #[tokio::test]
    async fn multiple_subscribers_each_get_every_message() {
        let bus = Bus::new();
        let mut a = bus.subscribe("topic");
        let mut b = bus.subscribe("topic");
        bus.publish("topic", 7i32);
        assert_eq!(a.recv_as::<i32>().await, Some(7));
        assert_eq!(b.recv_as::<i32>().await, Some(7));
    }

    /// Scenario S7: publish 1500 integers into a capacity-1000 channel
    /// without draining, then drain — must see exactly 500..1499, in order.
    #[tokio::test]
    async fn drop_oldest_scenario_s7() {
        let bus = Bus::new();
        let mut sub = bus.subscribe_with_capacity("topic", 1000);
        for i in 0..1500 {
            bus.publish("topic", i);
        }
        let mut received = Vec::new();
        while let Ok(Some(v)) =
            tokio::time::timeout(Duration::from_millis(50), sub.recv_as::<i32>()).await
        {
            received.push(v);
        }
        let expected: Vec<i32> = (500..1500).collect();
        assert_eq!(received, expected);
    }

    #[tokio::test]
    async fn dropped_subscription_is_removed() {
        let bus = Bus::new();
        {
            let _sub = bus.subscribe("topic");
            assert_eq!(bus.inner.topics.lock().by_name.get("topic").unwrap().len(), 1);
        }
        assert!(bus.inner.topics.lock().by_name.get("topic").is_none());
    }

    #[tokio::test]
    async fn shutdown_ends_subscriptions() {
        let bus = Bus::new();
        let mut sub = bus.subscribe("topic");
        bus.shutdown();
        assert_eq!(sub.recv_as::<i32>().await, None);
    }

    #[tokio::test]
    async fn independent_subscriptions_have_independent_buffers() {
        let bus = Bus::new();
        let mut a = bus.subscribe("topic");
        bus.publish("topic", 1i32);
        let mut b = bus.subscribe("topic");
        bus.publish("topic", 2i32);
        assert_eq!(a.recv_as::<i32>().await, Some(1));
        assert_eq!(a.recv_as::<i32>().await, Some(2));
        assert_eq!(b.recv_as::<i32>().await, Some(2));
    }
}
