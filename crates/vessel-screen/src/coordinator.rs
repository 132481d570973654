use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use vessel_ais::topics;
use vessel_bus::Bus;
use vessel_plugin::{PluginError, Screen};

use crate::command::{ScreenAction, ScreenCommand};

/// Owns an ordered list of screen instances; exactly one is active at a
/// time (spec §4.6). Switches on `screen.command` navigation events.
pub struct ScreenCoordinator {
    bus: Bus,
    screens: Vec<Box<dyn Screen>>,
    active_index: AtomicUsize,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ScreenCoordinator {
    /// `screens` must already be constructed in configured order; the
    /// coordinator itself does no plugin instantiation.
    pub fn new(bus: Bus, screens: Vec<Box<dyn Screen>>) -> Self {
        Self {
            bus,
            screens,
            active_index: AtomicUsize::new(0),
            task: Mutex::new(None),
        }
    }

    /// Activates screen 0 and starts listening for navigation commands.
    ///
    /// If no screens were configured this logs a warning and returns
    /// without error (spec §9's Open Question resolution: "skip with a
    /// warning").
    pub async fn start(self: &Arc<Self>) -> Result<(), PluginError> {
        if self.screens.is_empty() {
            tracing::warn!("no screens configured, screen coordinator idle");
            return Ok(());
        }

        self.screens[0].activate().await?;

        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            return Ok(());
        }

        let coordinator = self.clone();
        let mut subscription = self.bus.subscribe(topics::SCREEN_COMMAND);
        *task = Some(tokio::spawn(async move {
            while let Some(command) = subscription.recv_as::<ScreenCommand>().await {
                coordinator.handle_command(command).await;
            }
        }));
        Ok(())
    }

    /// Idempotent; cancels the command loop and deactivates the active
    /// screen.
    pub async fn stop(&self) {
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
        }

        if let Some(screen) = self.screens.get(self.active_index.load(Ordering::Acquire)) {
            if let Err(error) = screen.deactivate().await {
                tracing::error!(%error, "error deactivating screen");
            }
        }
    }

    async fn handle_command(&self, command: ScreenCommand) {
        let n = self.screens.len();
        if n <= 1 {
            // Single-screen commands are no-ops (spec §4.6).
            return;
        }

        let current = self.active_index.load(Ordering::Acquire);
        let next = match command.action {
            ScreenAction::Next => (current + 1) % n,
            ScreenAction::Previous => (current + n - 1) % n,
        };
        if next == current {
            return;
        }

        if let Err(error) = self.screens[current].deactivate().await {
            tracing::error!(%error, "error deactivating screen, switching anyway");
        }
        self.active_index.store(next, Ordering::Release);
        if let Err(error) = self.screens[next].activate().await {
            tracing::error!(%error, "error activating screen");
        }
    }
}
