pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod firecrawl;

use std::sync::Arc;
use config::Config;
use firecrawl::Extractor;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub extractor: Arc<dyn Extractor>,
}
