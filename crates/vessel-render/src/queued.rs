use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use vessel_bus::{Bus, Subscription};

/// An opaque request payload, analogous to `vessel_bus::BusMessage` (spec
/// §4.5's "optional opaque data payload per request").
pub type RenderPayload = Arc<dyn Any + Send + Sync>;

/// The consumer's render function, invoked with each request's payload.
#[async_trait]
pub trait RenderWithDataFn: Send + Sync {
    async fn render(&self, data: Option<RenderPayload>);
}

const QUEUE_TOPIC: &str = "vessel-render.queued";
const QUEUE_CAPACITY: usize = 20;

/// Serializing render strategy (spec §4.5's `QueuedRenderStrategy`): each
/// request is queued (capacity 20, oldest dropped when full) and triggers
/// exactly one render after interval enforcement.
///
/// Built directly on [`vessel_bus::Bus`] rather than a bespoke queue: a
/// private single-topic bus is exactly the drop-oldest bounded channel this
/// strategy needs, and reusing it means there is only one implementation of
/// that eviction policy in the whole workspace.
pub struct QueuedRenderStrategy {
    bus: Bus,
    render_fn: Arc<dyn RenderWithDataFn>,
    min_interval: Duration,
    last_render: Arc<Mutex<Option<Instant>>>,
    subscription: Mutex<Option<Subscription>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl QueuedRenderStrategy {
    pub fn new(render_fn: Arc<dyn RenderWithDataFn>, min_interval: Duration) -> Self {
        let bus = Bus::new();
        let subscription = bus.subscribe_with_capacity(QUEUE_TOPIC, QUEUE_CAPACITY);
        Self {
            bus,
            render_fn,
            min_interval,
            last_render: Arc::new(Mutex::new(None)),
            subscription: Mutex::new(Some(subscription)),
            task: Mutex::new(None),
        }
    }

    /// Queue a render request with optional payload data. If the queue is
    /// full, the oldest pending request is dropped (spec §4.5).
    pub fn request_render(&self, data: Option<RenderPayload>) {
        self.bus.publish(QUEUE_TOPIC, data);
    }

    /// Idempotent; spawns the background loop if not already running.
    pub fn start(&self) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        let Some(mut subscription) = self.subscription.lock().take() else {
            return;
        };

        let render_fn = self.render_fn.clone();
        let last_render = self.last_render.clone();
        let min_interval = self.min_interval;

        *task = Some(tokio::spawn(async move {
            while let Some(data) = subscription.recv_as::<Option<RenderPayload>>().await {
                let elapsed = (*last_render.lock()).map(|t| t.elapsed());
                if let Some(elapsed) = elapsed {
                    if elapsed < min_interval {
                        tokio::time::sleep(min_interval - elapsed).await;
                    }
                }
                render_fn.render(data).await;
                *last_render.lock() = Some(Instant::now());
            }
        }));
    }

    /// Idempotent; cancels the loop and waits for clean shutdown.
    pub async fn stop(&self) {
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingRender(Arc<AtomicUsize>);

    #[async_trait]
    impl RenderWithDataFn for CountingRender {
        async fn render(&self, _data: Option<RenderPayload>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn each_request_triggers_its_own_render() {
        let count = Arc::new(AtomicUsize::new(0));
        let strategy = QueuedRenderStrategy::new(Arc::new(CountingRender(count.clone())), Duration::from_millis(5));
        strategy.start();

        for _ in 0..3 {
            strategy.request_render(None);
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        strategy.stop().await;

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn drops_oldest_when_queue_is_full() {
        let count = Arc::new(AtomicUsize::new(0));
        let strategy = QueuedRenderStrategy::new(Arc::new(CountingRender(count.clone())), Duration::from_millis(0));

        for i in 0..(QUEUE_CAPACITY + 5) {
            strategy.request_render(Some(Arc::new(i) as RenderPayload));
        }

        strategy.start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        strategy.stop().await;

        assert_eq!(count.load(Ordering::SeqCst), QUEUE_CAPACITY);
    }
}
