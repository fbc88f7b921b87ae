use std::sync::Arc;

use crate::analysis::cv_extractor::CvAnalysisOptions;
use crate::config::Config;
use crate::storage::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable document store. Default: `FileStore` rooted at `DATA_DIR`.
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        Self { config, store }
    }

    pub fn cv_options(&self) -> CvAnalysisOptions {
        self.config.cv_options()
    }
}

#[cfg(test)]
pub fn test_state(root: &std::path::Path) -> AppState {
    let config = Config {
        data_dir: root.to_path_buf(),
        ..Config::default()
    };
    AppState::new(config, Arc::new(crate::storage::FileStore::new(root)))
}
