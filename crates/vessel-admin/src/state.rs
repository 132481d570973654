use std::sync::Arc;

use vessel_config::ConfigManager;
use vessel_manager::VesselManager;

/// Shared state handed to every admin route handler.
#[derive(Clone)]
pub struct AdminState {
    pub manager: Arc<VesselManager>,
    pub config: Arc<ConfigManager>,
}
