use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// The consumer's render function, invoked with no arguments. Implemented by
/// whatever screen or consumer owns the actual draw/flush logic.
#[async_trait]
pub trait RenderFn: Send + Sync {
    async fn render(&self);
}

struct DirtySignal {
    dirty: AtomicBool,
    notify: Notify,
}

impl DirtySignal {
    fn new() -> Self {
        Self {
            dirty: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    fn mark(&self) {
        self.dirty.store(true, Ordering::Release);
        self.notify.notify_one();
    }

    /// Block until dirty, matching the race-free registration order used by
    /// `vessel-bus`'s channel: register interest, then check the flag.
    async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            if self.dirty.load(Ordering::Acquire) {
                return;
            }
            notified.await;
        }
    }

    fn clear(&self) {
        self.dirty.store(false, Ordering::Release);
    }
}

/// Coalescing render strategy (spec §4.5's `PeriodicRenderStrategy`):
/// multiple `request_render` calls during `min_interval` collapse to at most
/// one render once the interval elapses.
pub struct PeriodicRenderStrategy {
    render_fn: Arc<dyn RenderFn>,
    min_interval: Duration,
    signal: Arc<DirtySignal>,
    last_render: Arc<Mutex<Option<Instant>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PeriodicRenderStrategy {
    pub fn new(render_fn: Arc<dyn RenderFn>, min_interval: Duration) -> Self {
        Self {
            render_fn,
            min_interval,
            signal: Arc::new(DirtySignal::new()),
            last_render: Arc::new(Mutex::new(None)),
            task: Mutex::new(None),
        }
    }

    /// Mark the strategy as needing a render; the actual render is deferred
    /// to the background loop.
    pub fn request_render(&self) {
        self.signal.mark();
    }

    /// Idempotent; spawns the background loop if not already running.
    pub fn start(&self) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        let render_fn = self.render_fn.clone();
        let signal = self.signal.clone();
        let last_render = self.last_render.clone();
        let min_interval = self.min_interval;

        *task = Some(tokio::spawn(async move {
            loop {
                signal.wait().await;
                wait_for_interval(&last_render, min_interval).await;
                // Clear before rendering: a request arriving during the
                // render below re-dirties the signal for a fresh pass,
                // so events during a render are never lost (spec §4.5).
                signal.clear();
                render_fn.render().await;
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

async fn wait_for_interval(last_render: &Mutex<Option<Instant>>, min_interval: Duration) {
    let elapsed = (*last_render.lock()).map(|t| t.elapsed());
    if let Some(elapsed) = elapsed {
        if elapsed < min_interval {
            tokio::time::sleep(min_interval - elapsed).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct CountingRender(Arc<AtomicUsize>);

    #[async_trait]
    impl RenderFn for CountingRender {
        async fn render(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn coalesces_bursts_into_one_render() {
        let count = Arc::new(AtomicUsize::new(0));
        let strategy = PeriodicRenderStrategy::new(Arc::new(CountingRender(count.clone())), Duration::from_millis(50));
        strategy.start();

        for _ in 0..10 {
            strategy.request_render();
        }
        tokio::time::sleep(Duration::from_millis(150)).await;
        strategy.stop().await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn honors_a_fresh_request_after_the_interval() {
        let count = Arc::new(AtomicUsize::new(0));
        let strategy = PeriodicRenderStrategy::new(Arc::new(CountingRender(count.clone())), Duration::from_millis(20));
        strategy.start();

        strategy.request_render();
        tokio::time::sleep(Duration::from_millis(60)).await;
        strategy.request_render();
        tokio::time::sleep(Duration::from_millis(60)).await;
        strategy.stop().await;

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
