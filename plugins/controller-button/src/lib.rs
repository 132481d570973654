//! Physical-button controller (spec §2 plugin roster): publishes
//! `screen.command` navigation events from GPIO-style button presses.
//!
//! Per spec §5, "GPIO-style callbacks... execute on a foreign thread and
//! must schedule publishes on the loop via a thread-safe scheduling
//! primitive; they never call bus APIs directly." This plugin has no real
//! GPIO library in the workspace to bind to (the target hardware's
//! interrupt-driven button library is itself out of scope, same as the
//! serial source's physical transport), so [`ButtonSource`] stands in for
//! it: a trait object invoked from a dedicated `std::thread`, exactly the
//! shape a real interrupt callback would have. The callback thread only
//! ever touches an `UnboundedSender<ScreenAction>`; a separate async task
//! drains it and is the only thing that calls `bus.publish`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle as ThreadHandle;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use vessel_ais::topics;
use vessel_bus::Bus;
use vessel_plugin::{Constructor, Plugin, PluginCategory, PluginConfig, PluginContext, PluginError, PluginFactory, PLUGIN_FACTORIES};
use vessel_screen::{ScreenAction, ScreenCommand};

/// A source of button-press events, invoked from a foreign (non-tokio)
/// thread. Implementations wrap the actual interrupt-driven GPIO library;
/// `poll` should block briefly and emit at most one press per call, then
/// return so the loop can re-check `should_stop`.
pub trait ButtonSource: Send + 'static {
    fn poll(&mut self, emit: &dyn Fn(ScreenAction), should_stop: &dyn Fn() -> bool);
}

/// The default [`ButtonSource`] for environments without real GPIO
/// hardware attached: alternates pressing "next" on a fixed cadence, so the
/// screen coordinator's navigation path is exercisable without a button
/// board.
pub struct SimulatedButtons {
    interval: std::time::Duration,
}

impl SimulatedButtons {
    pub fn new(interval: std::time::Duration) -> Self {
        Self { interval }
    }
}

impl ButtonSource for SimulatedButtons {
    fn poll(&mut self, emit: &dyn Fn(ScreenAction), should_stop: &dyn Fn() -> bool) {
        std::thread::sleep(self.interval);
        if should_stop() {
            return;
        }
        emit(ScreenAction::Next);
    }
}

pub struct ButtonController {
    bus: Bus,
    source: Mutex<Option<Box<dyn ButtonSource>>>,
    thread: Mutex<Option<ThreadHandle<()>>>,
    drain_task: Mutex<Option<JoinHandle<()>>>,
    stop: Mutex<Option<Arc<AtomicBool>>>,
}

impl ButtonController {
    pub fn new(bus: Bus, source: Box<dyn ButtonSource>) -> Self {
        Self {
            bus,
            source: Mutex::new(Some(source)),
            thread: Mutex::new(None),
            drain_task: Mutex::new(None),
            stop: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Plugin for ButtonController {
    async fn start(&self) -> Result<(), PluginError> {
        let mut thread = self.thread.lock();
        if thread.as_ref().is_some_and(|h| !h.is_finished()) {
            return Ok(());
        }

        let Some(mut source) = self.source.lock().take() else {
            return Ok(());
        };

        let (tx, mut rx) = mpsc::unbounded_channel::<ScreenAction>();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_for_thread = stop.clone();

        let handle = std::thread::spawn(move || {
            // The only thing this foreign thread touches is `tx`: an
            // `UnboundedSender::send` is a sync, non-blocking call, so the
            // GPIO callback never calls bus APIs directly (spec §5).
            let emit = |action: ScreenAction| {
                let _ = tx.send(action);
            };
            let should_stop = || stop_for_thread.load(Ordering::Acquire);
            while !should_stop() {
                source.poll(&emit, &should_stop);
            }
        });
        *thread = Some(handle);
        drop(thread);
        *self.stop.lock() = Some(stop);
        tracing::info!("button controller started");

        let bus = self.bus.clone();
        let mut drain_task = self.drain_task.lock();
        *drain_task = Some(tokio::spawn(async move {
            while let Some(action) = rx.recv().await {
                bus.publish(topics::SCREEN_COMMAND, ScreenCommand { action });
            }
        }));

        Ok(())
    }

    async fn stop(&self) -> Result<(), PluginError> {
        if let Some(stop) = self.stop.lock().take() {
            stop.store(true, Ordering::Release);
        }

        let drain_task = self.drain_task.lock().take();
        if let Some(drain_task) = drain_task {
            drain_task.abort();
            let _ = drain_task.await;
        }

        // The foreign thread wakes on its own polling cadence once it
        // observes `should_stop`; join it off the async executor so a slow
        // hardware handle cannot block the runtime.
        let thread = self.thread.lock().take();
        if let Some(thread) = thread {
            let _ = tokio::task::spawn_blocking(move || thread.join()).await;
        }
        tracing::info!("button controller stopped");
        Ok(())
    }
}

fn schema() -> vessel_plugin::ConfigSchema {
    use vessel_plugin::{ConfigField, FieldDefault, FieldType};
    const FIELDS: &[ConfigField] = &[ConfigField {
        key: "interval",
        label: "Simulated press interval (seconds)",
        field_type: FieldType::Float,
        default: FieldDefault::Float(30.0),
        options: &[],
    }];
    FIELDS
}

fn create(context: &PluginContext, config: &PluginConfig) -> Result<Box<dyn Plugin>, PluginError> {
    let interval = std::time::Duration::from_secs_f64(config.get_f64("interval", 30.0));
    let source = Box::new(SimulatedButtons::new(interval));
    Ok(Box::new(ButtonController::new(context.bus.clone(), source)))
}

#[linkme::distributed_slice(PLUGIN_FACTORIES)]
static FACTORY: PluginFactory = PluginFactory {
    name: "button",
    category: PluginCategory::Controller,
    schema,
    constructor: Constructor::Plugin(create),
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct OneShot {
        fired: bool,
    }

    impl ButtonSource for OneShot {
        fn poll(&mut self, emit: &dyn Fn(ScreenAction), should_stop: &dyn Fn() -> bool) {
            if !self.fired {
                self.fired = true;
                emit(ScreenAction::Next);
                return;
            }
            while !should_stop() {
                std::thread::sleep(Duration::from_millis(1));
            }
        }
    }

    #[tokio::test]
    async fn foreign_thread_press_reaches_the_bus() {
        let bus = Bus::new();
        let mut sub = bus.subscribe(topics::SCREEN_COMMAND);
        let controller = ButtonController::new(bus, Box::new(OneShot { fired: false }));

        controller.start().await.unwrap();
        let command: ScreenCommand = tokio::time::timeout(Duration::from_secs(1), sub.recv_as()).await.unwrap().unwrap();
        assert_eq!(command.action, ScreenAction::Next);

        controller.stop().await.unwrap();
    }

    #[tokio::test]
    async fn start_and_stop_are_idempotent() {
        let bus = Bus::new();
        let controller = ButtonController::new(bus, Box::new(SimulatedButtons::new(Duration::from_secs(60))));
        controller.start().await.unwrap();
        controller.start().await.unwrap();
        controller.stop().await.unwrap();
        controller.stop().await.unwrap();
    }
}
