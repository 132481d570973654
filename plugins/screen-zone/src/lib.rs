//! Vessel-detail screen (spec §2 plugin roster), following
//! `original_source/.../zone_screen`'s shape: tracks whichever vessel most
//! recently entered a zone and re-renders it on a
//! [`PeriodicRenderStrategy`] whose interval is the renderer's own floor
//! plus a configurable margin. Text layout and iconography are out of
//! scope (spec §1); the card is drawn as a single colour panel.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::Rgba;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use vessel_ais::topics;
use vessel_bus::Bus;
use vessel_manager::VesselZoneEntered;
use vessel_plugin::{Constructor, PluginCategory, PluginConfig, PluginContext, PluginError, PluginFactory, Renderer, Screen, PLUGIN_FACTORIES};
use vessel_render::{PeriodicRenderStrategy, RenderFn};

const PADDING: u32 = 10;

struct ZoneRenderFn {
    renderer: Arc<dyn Renderer>,
    current: Arc<Mutex<Option<VesselZoneEntered>>>,
}

#[async_trait]
impl RenderFn for ZoneRenderFn {
    async fn render(&self) {
        let Some(event) = self.current.lock().clone() else {
            return;
        };

        self.renderer.clear().await;
        let foreground = *self.renderer.palette().get("foreground").unwrap_or(&Rgba([255, 255, 255, 255]));

        {
            let canvas = self.renderer.canvas();
            let mut canvas = canvas.lock();
            let (width, height) = canvas.dimensions();
            for y in PADDING..height.saturating_sub(PADDING) {
                for x in PADDING..width.saturating_sub(PADDING) {
                    canvas.put_pixel(x, y, foreground);
                }
            }
        }
        tracing::debug!(mmsi = %event.mmsi, zone = %event.zone, "rendered zone detail card");

        if let Err(error) = self.renderer.flush().await {
            tracing::warn!(%error, "zone screen failed to flush renderer");
        }
    }
}

pub struct ZoneScreen {
    bus: Bus,
    in_topic: String,
    current: Arc<Mutex<Option<VesselZoneEntered>>>,
    strategy: Arc<PeriodicRenderStrategy>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ZoneScreen {
    pub fn new(bus: Bus, renderer: Arc<dyn Renderer>, in_topic: String, update_interval: Duration) -> Self {
        let interval = renderer.min_render_interval() + update_interval;
        let current = Arc::new(Mutex::new(None));
        let render_fn = Arc::new(ZoneRenderFn { renderer, current: current.clone() });
        let strategy = Arc::new(PeriodicRenderStrategy::new(render_fn, interval));
        Self { bus, in_topic, current, strategy, task: Mutex::new(None) }
    }

    async fn watch(bus: Bus, in_topic: String, current: Arc<Mutex<Option<VesselZoneEntered>>>, strategy: Arc<PeriodicRenderStrategy>) {
        let mut subscription = bus.subscribe(&in_topic);
        while let Some(event) = subscription.recv_as::<VesselZoneEntered>().await {
            *current.lock() = Some(event);
            strategy.request_render();
        }
    }
}

#[async_trait]
impl Screen for ZoneScreen {
    async fn activate(&self) -> Result<(), PluginError> {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            return Ok(());
        }
        self.strategy.start();
        *task = Some(tokio::spawn(Self::watch(self.bus.clone(), self.in_topic.clone(), self.current.clone(), self.strategy.clone())));
        Ok(())
    }

    async fn deactivate(&self) -> Result<(), PluginError> {
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
        }
        self.strategy.stop().await;
        Ok(())
    }
}

fn schema() -> vessel_plugin::ConfigSchema {
    use vessel_plugin::{ConfigField, FieldDefault, FieldType};
    const FIELDS: &[ConfigField] =
        &[ConfigField { key: "update_interval", label: "Extra margin over the renderer's floor (seconds)", field_type: FieldType::Float, default: FieldDefault::Float(10.0), options: &[] }];
    FIELDS
}

fn create(context: &PluginContext, config: &PluginConfig) -> Result<Box<dyn Screen>, PluginError> {
    let renderer = context.renderer.clone().ok_or_else(|| PluginError::Instantiation {
        name: "screen-zone".to_string(),
        source: "no renderer configured".into(),
    })?;
    let in_topic = config.get_str("in_topic", topics::VESSEL_ZONE_ENTERED);
    let update_interval = Duration::from_secs_f64(config.get_f64("update_interval", 10.0));

    Ok(Box::new(ZoneScreen::new(context.bus.clone(), renderer, in_topic, update_interval)))
}

#[linkme::distributed_slice(PLUGIN_FACTORIES)]
static FACTORY: PluginFactory = PluginFactory {
    name: "zone",
    category: PluginCategory::Screen,
    schema,
    constructor: Constructor::Screen(create),
};

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use vessel_ais::Mmsi;
    use vessel_manager::VesselRecord;
    use vessel_plugin::ConfigSchema;

    use super::*;

    struct StubRenderer {
        canvas: vessel_plugin::Canvas,
        fonts: HashMap<String, Vec<u8>>,
        palette: HashMap<String, Rgba<u8>>,
        flushes: AtomicUsize,
    }

    impl StubRenderer {
        fn new() -> Self {
            Self {
                canvas: Arc::new(parking_lot::Mutex::new(image::RgbaImage::new(64, 64))),
                fonts: HashMap::new(),
                palette: HashMap::new(),
                flushes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Renderer for StubRenderer {
        fn canvas(&self) -> vessel_plugin::Canvas {
            self.canvas.clone()
        }
        fn fonts(&self) -> &HashMap<String, Vec<u8>> {
            &self.fonts
        }
        fn palette(&self) -> &HashMap<String, Rgba<u8>> {
            &self.palette
        }
        fn min_render_interval(&self) -> Duration {
            Duration::from_millis(1)
        }
        async fn clear(&self) {
            let mut canvas = self.canvas.lock();
            for pixel in canvas.pixels_mut() {
                *pixel = Rgba([0, 0, 0, 255]);
            }
        }
        async fn flush(&self) -> Result<(), PluginError> {
            self.flushes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn zone_entry_triggers_a_render() {
        let bus = Bus::new();
        let stub = Arc::new(StubRenderer::new());
        let renderer: Arc<dyn Renderer> = stub.clone();
        let screen = ZoneScreen::new(bus.clone(), renderer, topics::VESSEL_ZONE_ENTERED.to_string(), Duration::from_millis(1));

        screen.activate().await.unwrap();
        bus.publish(
            topics::VESSEL_ZONE_ENTERED,
            VesselZoneEntered {
                mmsi: Mmsi::from_raw(235098765).unwrap(),
                zone: "harbour".to_string(),
                vessel: VesselRecord::empty(Mmsi::from_raw(235098765).unwrap()),
            },
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        screen.deactivate().await.unwrap();

        assert!(stub.flushes.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn activate_and_deactivate_are_idempotent() {
        let bus = Bus::new();
        let renderer: Arc<dyn Renderer> = Arc::new(StubRenderer::new());
        let screen = ZoneScreen::new(bus, renderer, topics::VESSEL_ZONE_ENTERED.to_string(), Duration::from_millis(1));

        screen.activate().await.unwrap();
        screen.activate().await.unwrap();
        screen.deactivate().await.unwrap();
        screen.deactivate().await.unwrap();
    }

    #[test]
    fn schema_exposes_update_interval() {
        let fields: ConfigSchema = schema();
        assert!(fields.iter().any(|f| f.key == "update_interval"));
    }
}
