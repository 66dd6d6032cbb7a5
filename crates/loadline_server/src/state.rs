//! Application state

use std::sync::Arc;

use loadline_core::FlightCatalog;

use crate::{config::ServerConfig, error::ServerResult};

#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub catalog: Arc<FlightCatalog>,
}

impl AppState {
    /// Load the configured data file once; it is read-only afterwards
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        let catalog = FlightCatalog::load(&config.data_file)
            .await?
            .with_history_days(config.history_days);
        Ok(Self::from_catalog(config, catalog))
    }

    pub fn from_catalog(config: ServerConfig, catalog: FlightCatalog) -> Self {
        Self {
            config,
            catalog: Arc::new(catalog),
        }
    }
}
