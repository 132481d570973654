use crate::category::PluginCategory;

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("no plugin named '{name}' in category '{category}' (available: {})", available.join(", "))]
    NotFound {
        category: PluginCategory,
        name: String,
        available: Vec<String>,
    },

    #[error("plugin '{name}' is registered under a different category than requested (expected {expected})")]
    WrongCategory { name: String, expected: &'static str },

    #[error("plugin '{name}' failed to start")]
    Instantiation {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("plugin '{name}' runtime error")]
    Runtime {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
