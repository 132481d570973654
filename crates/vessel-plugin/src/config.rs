//! Per-plugin configuration: the config file's `[plugin_name]` table,
//! "passed verbatim as constructor kwargs" (spec §6), plus the typed
//! schema a plugin advertises for the admin surface to render a form from.

use toml::Table;
use toml::Value;

/// Primitive type of a configurable field, for admin-surface form rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
}

/// A field's default, restricted to `const`-constructible primitives so
/// `ConfigSchema`s can live in `'static` arrays.
#[derive(Debug, Clone, Copy)]
pub enum FieldDefault {
    Str(&'static str),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
}

/// One entry in a plugin's config schema (spec §4.2: "list of typed fields
/// with defaults, labels, options").
#[derive(Debug, Clone, Copy)]
pub struct ConfigField {
    pub key: &'static str,
    pub label: &'static str,
    pub field_type: FieldType,
    pub default: FieldDefault,
    pub options: &'static [&'static str],
}

/// `&'static` schema, as returned by a [`crate::registry::PluginFactory`].
pub type ConfigSchema = &'static [ConfigField];

/// The verbatim table configured for one plugin instance.
#[derive(Debug, Clone, Default)]
pub struct PluginConfig {
    values: Table,
}

impl PluginConfig {
    pub fn new(values: Table) -> Self {
        Self { values }
    }

    pub fn raw(&self) -> &Table {
        &self.values
    }

    pub fn get_str(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn get_i64(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).and_then(Value::as_integer).unwrap_or(default)
    }

    pub fn get_f64(&self, key: &str, default: f64) -> f64 {
        self.values.get(key).and_then(Value::as_float).unwrap_or(default)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.values.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn get_str_list(&self, key: &str) -> Vec<String> {
        self.values
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default()
    }
}
