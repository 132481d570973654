use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;

use crate::error::PluginError;

/// Pixel buffer shared by screens for drawing, owned by the active
/// [`Renderer`] (spec §4.2's "Renderer contract").
pub type Canvas = Arc<Mutex<RgbaImage>>;

/// Every source, processor, controller and screen implements this: an
/// idempotent start/stop lifecycle (spec §4.2's "Plugin contract").
#[async_trait]
pub trait Plugin: Send + Sync {
    async fn start(&self) -> Result<(), PluginError>;
    async fn stop(&self) -> Result<(), PluginError>;
}

/// The single active renderer instance (spec §4.2's "Renderer contract").
#[async_trait]
pub trait Renderer: Send + Sync {
    fn canvas(&self) -> Canvas;
    fn fonts(&self) -> &HashMap<String, Vec<u8>>;
    fn palette(&self) -> &HashMap<String, Rgba<u8>>;

    /// Minimum seconds between flushes the hardware can sustain.
    fn min_render_interval(&self) -> Duration;

    async fn clear(&self);
    async fn flush(&self) -> Result<(), PluginError>;
}

/// A screen that draws onto the renderer's canvas in response to bus events
/// (spec §4.2's "Screen contract").
#[async_trait]
pub trait Screen: Send + Sync {
    async fn activate(&self) -> Result<(), PluginError>;
    async fn deactivate(&self) -> Result<(), PluginError>;
}
