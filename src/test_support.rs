use axum::Router;

use crate::config::DecoderConfig;
use crate::state::AppState;

pub fn test_config() -> DecoderConfig {
    DecoderConfig {
        cors_origins: vec!["http://localhost:3000".to_string()],
        ..DecoderConfig::default()
    }
}

pub fn test_state() -> AppState {
    AppState::new(test_config())
}

pub fn test_app() -> Router {
    crate::routes::router(test_state())
}
