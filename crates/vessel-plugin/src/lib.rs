//! Plugin categories, config schema types and the compile-time plugin
//! registry (spec §4.2).

mod category;
mod config;
mod context;
mod error;
mod registry;
mod traits;

pub use category::PluginCategory;
pub use config::{ConfigField, ConfigSchema, FieldDefault, FieldType, PluginConfig};
pub use context::PluginContext;
pub use error::PluginError;
pub use registry::{Constructor, PluginFactory, Registry, PLUGIN_FACTORIES};
pub use traits::{Canvas, Plugin, Renderer, Screen};
