use std::sync::Arc;

use crate::config::Config;
use crate::translate::TranslationService;

/// Shared application state. The translation service is built once at startup
/// and holds no per-request state, so handlers share it without locking.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub translator: Arc<TranslationService>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let translator = Arc::new(TranslationService::new(&config.translation_config));
        Self { config, translator }
    }
}
