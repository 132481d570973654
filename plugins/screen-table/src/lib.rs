//! Tabular "recently observed vessels" screen (spec §2 plugin roster),
//! following `original_source/.../table_screen`'s activate/deactivate +
//! `PeriodicRenderStrategy` shape. Text layout and iconography are out of
//! scope (spec §1); rows are drawn as plain colour bands so the screen
//! contract (clear/draw/flush on a real canvas) is still exercised.

use std::sync::Arc;

use async_trait::async_trait;
use image::Rgba;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use vessel_ais::topics;
use vessel_bus::Bus;
use vessel_manager::VesselManager;
use vessel_plugin::{Constructor, PluginCategory, PluginConfig, PluginContext, PluginError, PluginFactory, Renderer, Screen, PLUGIN_FACTORIES};
use vessel_render::{PeriodicRenderStrategy, RenderFn};

const ROW_HEIGHT: u32 = 40;
const ROW_GAP: u32 = 4;
const MARGIN: u32 = 10;
const RECENT_LIMIT: usize = 12;

struct TableRenderFn {
    renderer: Arc<dyn Renderer>,
    manager: Arc<VesselManager>,
}

#[async_trait]
impl RenderFn for TableRenderFn {
    async fn render(&self) {
        self.renderer.clear().await;

        let vessels = self.manager.get_recent_vessels(RECENT_LIMIT);
        let line = *self.renderer.palette().get("line").unwrap_or(&Rgba([0, 0, 0, 255]));
        let foreground = *self.renderer.palette().get("foreground").unwrap_or(&Rgba([255, 255, 255, 255]));

        {
            let canvas = self.renderer.canvas();
            let mut canvas = canvas.lock();
            let (width, height) = canvas.dimensions();

            for (i, _vessel) in vessels.iter().enumerate() {
                let y0 = MARGIN + i as u32 * (ROW_HEIGHT + ROW_GAP);
                let y1 = y0 + ROW_HEIGHT;
                if y1 >= height {
                    break;
                }
                for y in y0..y1 {
                    for x in MARGIN..width.saturating_sub(MARGIN) {
                        let colour = if y == y0 || y == y1 - 1 { line } else { foreground };
                        canvas.put_pixel(x, y, colour);
                    }
                }
            }
        }

        if let Err(error) = self.renderer.flush().await {
            tracing::warn!(%error, "table screen failed to flush renderer");
        }
    }
}

pub struct TableScreen {
    bus: Bus,
    in_topic: String,
    strategy: Arc<PeriodicRenderStrategy>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TableScreen {
    pub fn new(bus: Bus, renderer: Arc<dyn Renderer>, manager: Arc<VesselManager>, in_topic: String, update_interval: std::time::Duration) -> Self {
        let min_interval = update_interval.max(renderer.min_render_interval());
        let strategy = Arc::new(PeriodicRenderStrategy::new(Arc::new(TableRenderFn { renderer, manager }), min_interval));
        Self { bus, in_topic, strategy, task: Mutex::new(None) }
    }

    async fn watch(bus: Bus, in_topic: String, strategy: Arc<PeriodicRenderStrategy>) {
        let mut subscription = bus.subscribe(&in_topic);
        while subscription.recv().await.is_some() {
            strategy.request_render();
        }
    }
}

#[async_trait]
impl Screen for TableScreen {
    async fn activate(&self) -> Result<(), PluginError> {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            return Ok(());
        }
        self.strategy.start();
        *task = Some(tokio::spawn(Self::watch(self.bus.clone(), self.in_topic.clone(), self.strategy.clone())));
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
        &[ConfigField { key: "update_interval", label: "Minimum update interval (seconds)", field_type: FieldType::Float, default: FieldDefault::Float(30.0), options: &[] }];
    FIELDS
}

fn create(context: &PluginContext, config: &PluginConfig) -> Result<Box<dyn Screen>, PluginError> {
    let renderer = context.renderer.clone().ok_or_else(|| PluginError::Instantiation {
        name: "screen-table".to_string(),
        source: "no renderer configured".into(),
    })?;
    let in_topic = config.get_str("in_topic", topics::VESSEL_UPDATED);
    let update_interval = std::time::Duration::from_secs_f64(config.get_f64("update_interval", 30.0));

    Ok(Box::new(TableScreen::new(context.bus.clone(), renderer, context.manager.clone(), in_topic, update_interval)))
}

#[linkme::distributed_slice(PLUGIN_FACTORIES)]
static FACTORY: PluginFactory = PluginFactory {
    name: "table",
    category: PluginCategory::Screen,
    schema,
    constructor: Constructor::Screen(create),
};

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use vessel_ais::{topics, DecodedMessage};
    use vessel_manager::ManagerConfig;
    use vessel_plugin::ConfigSchema;
    use vessel_repository::Repository;

    use super::*;

    struct StubRenderer {
        canvas: Canvas,
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
        fn canvas(&self) -> Canvas {
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

    async fn in_memory_manager(bus: Bus) -> Arc<VesselManager> {
        let repository = Arc::new(Repository::start(":memory:").await.unwrap());
        let manager = Arc::new(VesselManager::new(bus, repository, ManagerConfig::default()));
        manager.start();
        manager
    }

    #[tokio::test]
    async fn activate_and_deactivate_are_idempotent() {
        let bus = Bus::new();
        let manager = in_memory_manager(bus.clone()).await;
        let renderer: Arc<dyn Renderer> = Arc::new(StubRenderer::new());
        let screen = TableScreen::new(bus, renderer, manager, topics::VESSEL_UPDATED.to_string(), Duration::from_millis(1));

        screen.activate().await.unwrap();
        screen.activate().await.unwrap();
        screen.deactivate().await.unwrap();
        screen.deactivate().await.unwrap();
    }

    #[tokio::test]
    async fn vessel_update_triggers_a_render() {
        let bus = Bus::new();
        let manager = in_memory_manager(bus.clone()).await;
        let stub = Arc::new(StubRenderer::new());
        let renderer: Arc<dyn Renderer> = stub.clone();
        let screen = TableScreen::new(bus.clone(), renderer, manager, topics::VESSEL_UPDATED.to_string(), Duration::from_millis(1));

        screen.activate().await.unwrap();
        bus.publish(
            topics::VESSEL_UPDATED,
            DecodedMessage {
                mmsi: 123456789,
                msg_type: 1,
                lat: Some(1.0),
                lon: Some(2.0),
                ..Default::default()
            },
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        screen.deactivate().await.unwrap();

        assert!(stub.flushes.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn schema_exposes_update_interval() {
        let fields: ConfigSchema = schema();
        assert!(fields.iter().any(|f| f.key == "update_interval"));
    }
}
