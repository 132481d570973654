use std::fmt;

/// Plugin groups, per spec §4.2 ("sources", "processors", "controllers",
/// "renderer", "screens").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginCategory {
    Source,
    Processor,
    Controller,
    Renderer,
    Screen,
}

impl PluginCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            PluginCategory::Source => "sources",
            PluginCategory::Processor => "processors",
            PluginCategory::Controller => "controllers",
            PluginCategory::Renderer => "renderer",
            PluginCategory::Screen => "screens",
        }
    }
}

impl fmt::Display for PluginCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
