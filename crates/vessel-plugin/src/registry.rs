//! The compile-time factory directory (spec §4.2's "Plugin Registry").
//!
//! The original discovers plugins through the host's extension-point
//! metadata at runtime; this crate resolves name + category to a factory at
//! compile time instead (spec §9: "prefer a compile-time registry table ...
//! over dynamic loading unless runtime plugin swap is required"), following
//! the teacher's `#[distributed_slice(EXTENSIONS)]` idiom.

use std::collections::HashMap;
use std::sync::OnceLock;

use linkme::distributed_slice;

use crate::category::PluginCategory;
use crate::config::{ConfigSchema, PluginConfig};
use crate::context::PluginContext;
use crate::error::PluginError;
use crate::traits::{Plugin, Renderer, Screen};

/// The category-specific constructor a [`PluginFactory`] carries.
///
/// Categories do not share a contract (sources/processors/controllers
/// implement [`Plugin`], the renderer implements [`Renderer`], screens
/// implement [`Screen`]), so a single `fn(..) -> Box<dyn Any>` would only
/// push the type error from compile time to a runtime downcast. This enum
/// keeps construction checked at the call site instead.
pub enum Constructor {
    Plugin(fn(&PluginContext, &PluginConfig) -> Result<Box<dyn Plugin>, PluginError>),
    Renderer(fn(&PluginContext, &PluginConfig) -> Result<Box<dyn Renderer>, PluginError>),
    Screen(fn(&PluginContext, &PluginConfig) -> Result<Box<dyn Screen>, PluginError>),
}

/// One plugin's self-registration entry.
pub struct PluginFactory {
    pub name: &'static str,
    pub category: PluginCategory,
    pub schema: fn() -> ConfigSchema,
    pub constructor: Constructor,
}

/// Plugins self-register here with `#[distributed_slice(PLUGIN_FACTORIES)]`.
#[distributed_slice]
pub static PLUGIN_FACTORIES: [PluginFactory] = [..];

type Index = HashMap<(PluginCategory, &'static str), &'static PluginFactory>;

/// A directory over [`PLUGIN_FACTORIES`], indexed once on first use.
pub struct Registry {
    index: OnceLock<Index>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            index: OnceLock::new(),
        }
    }

    fn index(&self) -> &Index {
        self.index.get_or_init(|| {
            PLUGIN_FACTORIES
                .iter()
                .map(|factory| ((factory.category, factory.name), factory))
                .collect()
        })
    }

    /// Enumerate available plugin names in `category`, sorted for stable
    /// output (spec §4.2's `names(group)`).
    pub fn names(&self, category: PluginCategory) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .index()
            .keys()
            .filter(|(c, _)| *c == category)
            .map(|(_, name)| *name)
            .collect();
        names.sort_unstable();
        names
    }

    fn load_factory(&self, category: PluginCategory, name: &str) -> Result<&'static PluginFactory, PluginError> {
        self.index().get(&(category, name)).copied().ok_or_else(|| PluginError::NotFound {
            category,
            name: name.to_string(),
            available: self.names(category).into_iter().map(str::to_string).collect(),
        })
    }

    /// Per-plugin config schema, if the factory defines one (spec §4.2's
    /// `schema(name)`).
    pub fn schema(&self, category: PluginCategory, name: &str) -> Result<ConfigSchema, PluginError> {
        Ok((self.load_factory(category, name)?.schema)())
    }

    /// Instantiate a source, processor or controller plugin (spec §4.2's
    /// `create(group, name, **kwargs)`, specialized to the `Plugin` trait).
    pub fn create_plugin(
        &self,
        category: PluginCategory,
        name: &str,
        context: &PluginContext,
        config: &PluginConfig,
    ) -> Result<Box<dyn Plugin>, PluginError> {
        match &self.load_factory(category, name)?.constructor {
            Constructor::Plugin(ctor) => ctor(context, config),
            _ => Err(PluginError::WrongCategory {
                name: name.to_string(),
                expected: "plugin",
            }),
        }
    }

    pub fn create_renderer(&self, name: &str, context: &PluginContext, config: &PluginConfig) -> Result<Box<dyn Renderer>, PluginError> {
        match &self.load_factory(PluginCategory::Renderer, name)?.constructor {
            Constructor::Renderer(ctor) => ctor(context, config),
            _ => Err(PluginError::WrongCategory {
                name: name.to_string(),
                expected: "renderer",
            }),
        }
    }

    pub fn create_screen(&self, name: &str, context: &PluginContext, config: &PluginConfig) -> Result<Box<dyn Screen>, PluginError> {
        match &self.load_factory(PluginCategory::Screen, name)?.constructor {
            Constructor::Screen(ctor) => ctor(context, config),
            _ => Err(PluginError::WrongCategory {
                name: name.to_string(),
                expected: "screen",
            }),
        }
    }
}
