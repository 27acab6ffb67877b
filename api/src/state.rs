use std::sync::Arc;

use crate::ai::AiService;
use crate::config::AppConfig;
use crate::storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub ai: Arc<AiService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, ai: AiService, config: AppConfig) -> Self {
        Self {
            storage,
            ai: Arc::new(ai),
            config: Arc::new(config),
        }
    }
}
