//! Server configuration

use std::path::PathBuf;

use loadline_core::{LoadlineConfig, catalog::DEFAULT_HISTORY_DAYS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "127.0.0.1:8000")
    pub bind_address: String,

    /// Flight data file served by the API
    pub data_file: PathBuf,

    /// Days of history per route for unscoped history requests
    pub history_days: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let section = loadline_core::config::ServerSection::default();
        Self {
            bind_address: section.bind_address,
            data_file: section.data_file,
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }
}

impl ServerConfig {
    pub fn from_loadline(config: &LoadlineConfig) -> Self {
        Self {
            bind_address: config.server.bind_address.clone(),
            data_file: config.server.data_file.clone(),
            history_days: config.dashboard.history_days,
        }
    }

    /// Apply `LOADLINE_BIND` and `LOADLINE_DATA_FILE` when set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(bind) = std::env::var("LOADLINE_BIND") {
            self.bind_address = bind;
        }
        if let Ok(path) = std::env::var("LOADLINE_DATA_FILE") {
            self.data_file = PathBuf::from(path);
        }
        self
    }
}
