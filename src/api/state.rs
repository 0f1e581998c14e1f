//! Application state for the payroll engine API.

use std::sync::Arc;

use crate::config::ConfigLoader;

/// Shared application state.
///
/// Holds the loaded rate tables and jurisdictions; every batch started by a
/// handler shares the same read-only configuration.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns a shared handle to the configuration, for batch workers.
    pub fn shared_config(&self) -> Arc<ConfigLoader> {
        Arc::clone(&self.config)
    }
}
