//! Image-file renderer (spec §2 plugin roster): the single active
//! [`Renderer`] instance, owning an in-memory RGBA canvas that screens draw
//! onto and flushing it to a PNG file. Font loading and icon drawing are
//! explicitly out of scope (spec §1: "per-plugin rendering aesthetics...
//! specified only through the renderer/screen contract"), so `fonts()`
//! returns an empty table; screens that want text rendering supply their
//! own font bytes through config.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use parking_lot::Mutex as SyncMutex;

use vessel_plugin::{Canvas, Constructor, PluginCategory, PluginConfig, PluginContext, PluginError, PluginFactory, Renderer, PLUGIN_FACTORIES};

pub struct ImageRenderer {
    canvas: Canvas,
    fonts: HashMap<String, Vec<u8>>,
    palette: HashMap<String, Rgba<u8>>,
    out_path: PathBuf,
    min_render_interval: Duration,
}

impl ImageRenderer {
    pub fn new(out_path: PathBuf, width: u32, height: u32, min_render_interval: Duration) -> Self {
        let mut palette = HashMap::new();
        palette.insert("background".to_string(), Rgba([0, 0, 255, 255]));
        palette.insert("foreground".to_string(), Rgba([255, 255, 255, 255]));
        palette.insert("line".to_string(), Rgba([0, 0, 255, 255]));
        palette.insert("text".to_string(), Rgba([0, 0, 255, 255]));

        Self {
            canvas: std::sync::Arc::new(SyncMutex::new(RgbaImage::new(width, height))),
            fonts: HashMap::new(),
            palette,
            out_path,
            min_render_interval,
        }
    }
}

#[async_trait]
impl Renderer for ImageRenderer {
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
        self.min_render_interval
    }

    async fn clear(&self) {
        let background = *self.palette.get("background").unwrap_or(&Rgba([0, 0, 0, 255]));
        let mut canvas = self.canvas.lock();
        for pixel in canvas.pixels_mut() {
            *pixel = background;
        }
    }

    async fn flush(&self) -> Result<(), PluginError> {
        let canvas = self.canvas.clone();
        let out_path = self.out_path.clone();

        tokio::task::spawn_blocking(move || -> Result<(), PluginError> {
            if let Some(parent) = out_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|source| PluginError::Runtime {
                        name: "renderer-image".to_string(),
                        source: Box::new(source),
                    })?;
                }
            }
            let snapshot = canvas.lock().clone();
            snapshot.save(&out_path).map_err(|source| PluginError::Runtime {
                name: "renderer-image".to_string(),
                source: Box::new(source),
            })
        })
        .await
        .map_err(|source| PluginError::Runtime { name: "renderer-image".to_string(), source: Box::new(source) })?
    }
}

fn schema() -> vessel_plugin::ConfigSchema {
    use vessel_plugin::{ConfigField, FieldDefault, FieldType};
    const FIELDS: &[ConfigField] = &[
        ConfigField { key: "out_path", label: "Output path", field_type: FieldType::String, default: FieldDefault::Str("data/image.png"), options: &[] },
        ConfigField { key: "width", label: "Canvas width", field_type: FieldType::Integer, default: FieldDefault::Int(480), options: &[] },
        ConfigField { key: "height", label: "Canvas height", field_type: FieldType::Integer, default: FieldDefault::Int(800), options: &[] },
    ];
    FIELDS
}

fn create(_context: &PluginContext, config: &PluginConfig) -> Result<Box<dyn Renderer>, PluginError> {
    let out_path = PathBuf::from(config.get_str("out_path", "data/image.png"));
    let width = config.get_i64("width", 480) as u32;
    let height = config.get_i64("height", 800) as u32;
    let min_render_interval = Duration::from_secs_f64(config.get_f64("min_render_interval", 1.0));

    Ok(Box::new(ImageRenderer::new(out_path, width, height, min_render_interval)))
}

#[linkme::distributed_slice(PLUGIN_FACTORIES)]
static FACTORY: PluginFactory = PluginFactory {
    name: "image",
    category: PluginCategory::Renderer,
    schema,
    constructor: Constructor::Renderer(create),
};
