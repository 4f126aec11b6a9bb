pub mod generate;
pub mod health;
pub mod metrics_handler;

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::config::Config;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ArcSwap<Config>>,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Arc<ArcSwap<Config>>) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}
