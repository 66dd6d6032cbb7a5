//! API response types

use loadline_core::{Flight, HistoricalPoint};
use serde::{Deserialize, Serialize};

use crate::requests::{FlightsQueryParams, HistoricalQueryParams};

pub use loadline_core::catalog::{CatalogSummary, RiskBreakdown};
pub use loadline_core::source::FeedbackReceipt;

/// Body of `GET /logistics/data/flights`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightsResponse {
    pub flights: Vec<Flight>,
    /// Matches before paging
    pub total: usize,
    pub query: FlightsQueryParams,
}

/// Body of `GET /logistics/data/historical`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalResponse {
    pub historical_data: Vec<HistoricalPoint>,
    pub routes: Vec<String>,
    pub total: usize,
    pub query: HistoricalQueryParams,
}

/// Body of `GET /logistics/data/flights/{id}`
///
/// An unknown flight is still a 200 with `flight: null` and an error line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightLookupResponse {
    pub flight: Option<Flight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FlightLookupResponse {
    pub fn found(flight: Flight) -> Self {
        Self {
            flight: Some(flight),
            error: None,
        }
    }

    pub fn missing(flight_id: &str) -> Self {
        Self {
            flight: None,
            error: Some(format!("Flight {} not found", flight_id)),
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub flights_loaded: usize,
}
