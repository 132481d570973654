//! The shared collaborators every plugin factory is handed at construction
//! time (spec §4.2's `create(group, name, **kwargs)`, where the original's
//! `**kwargs` silently carries `bus`, `vm`, `renderer` alongside the plugin's
//! own config). A `fn(&PluginConfig) -> ...` factory has nowhere to receive
//! those, so construction takes this context object too.

use std::sync::Arc;

use vessel_bus::Bus;
use vessel_manager::VesselManager;

use crate::traits::Renderer;

/// Handed to every plugin factory alongside its own [`crate::PluginConfig`].
///
/// `renderer` is `None` until the orchestrator has constructed the
/// configured renderer plugin (sources/processors/controllers never need
/// it; screens do, so the orchestrator constructs the renderer first).
#[derive(Clone)]
pub struct PluginContext {
    pub bus: Bus,
    pub manager: Arc<VesselManager>,
    pub renderer: Option<Arc<dyn Renderer>>,
}

impl PluginContext {
    pub fn new(bus: Bus, manager: Arc<VesselManager>) -> Self {
        Self { bus, manager, renderer: None }
    }

    /// A copy of this context with `renderer` attached, once one exists.
    pub fn with_renderer(&self, renderer: Arc<dyn Renderer>) -> Self {
        Self { bus: self.bus.clone(), manager: self.manager.clone(), renderer: Some(renderer) }
    }
}
