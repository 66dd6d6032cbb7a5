//! Where the CLI gets its flights from

use std::path::Path;

use async_trait::async_trait;
use loadline_api::RestFlightSource;
use loadline_core::{
    Feedback, Flight, FlightCatalog, FlightDataSource, FlightQuery, HistoricalPoint,
    LoadlineConfig, Route,
    catalog::CatalogSummary,
    source::FeedbackReceipt,
};
use miette::{IntoDiagnostic, Result};

/// The logistics REST API, or a local flight data file
#[derive(Debug)]
pub enum DataSource {
    Rest(RestFlightSource),
    Local(FlightCatalog),
}

impl DataSource {
    /// A data file (flag or config) wins over the REST API
    pub async fn open(config: &LoadlineConfig, data_file: Option<&Path>) -> Result<Self> {
        let data_file = data_file.or(config.data.data_file.as_deref());
        match data_file {
            Some(path) => {
                tracing::debug!("Using local flight data from {}", path.display());
                let catalog = FlightCatalog::load(path)
                    .await?
                    .with_history_days(config.dashboard.history_days);
                Ok(Self::Local(catalog))
            }
            None => {
                tracing::debug!("Using logistics API at {}", config.data.base_url);
                let client = RestFlightSource::from_config(&config.data)
                    .into_diagnostic()?
                    .with_history_days(config.dashboard.history_days);
                Ok(Self::Rest(client))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Rest(client) => client.base_url().to_string(),
            Self::Local(catalog) => format!("local file ({} flights)", catalog.flights().len()),
        }
    }

    pub async fn summary(&self) -> Result<CatalogSummary> {
        match self {
            Self::Rest(client) => client.summary().await.into_diagnostic(),
            Self::Local(catalog) => Ok(catalog.summary()),
        }
    }
}

#[async_trait]
impl FlightDataSource for DataSource {
    async fn query_flights(&self, query: &FlightQuery) -> loadline_core::Result<Vec<Flight>> {
        match self {
            Self::Rest(client) => client.query_flights(query).await,
            Self::Local(catalog) => catalog.query_flights(query).await,
        }
    }

    async fn query_historical(
        &self,
        route: Option<&Route>,
    ) -> loadline_core::Result<Vec<HistoricalPoint>> {
        match self {
            Self::Rest(client) => client.query_historical(route).await,
            Self::Local(catalog) => catalog.query_historical(route).await,
        }
    }

    async fn flight_by_number(&self, flight_number: &str) -> loadline_core::Result<Option<Flight>> {
        match self {
            Self::Rest(client) => client.flight_by_number(flight_number).await,
            Self::Local(catalog) => catalog.flight_by_number(flight_number).await,
        }
    }

    async fn submit_feedback(&self, feedback: &Feedback) -> loadline_core::Result<FeedbackReceipt> {
        match self {
            Self::Rest(client) => client.submit_feedback(feedback).await,
            Self::Local(catalog) => catalog.submit_feedback(feedback).await,
        }
    }
}
