use crate::config::DecoderConfig;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DecoderConfig>,
}

impl AppState {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}
