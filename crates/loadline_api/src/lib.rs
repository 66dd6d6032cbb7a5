//! Loadline API types and definitions
//!
//! This crate defines the request/response types of the logistics data API,
//! shared between the server and the REST client the dashboard uses.

#[cfg(feature = "client")]
pub mod client;
pub mod error;
pub mod requests;
pub mod responses;

#[cfg(feature = "client")]
pub use client::RestFlightSource;
pub use error::{ApiError, FieldError};

// Re-export the wire-level types from loadline-core
pub use loadline_core::{Feedback, Flight, HistoricalPoint, Vote};

/// Endpoint paths of the logistics API
pub mod paths {
    pub const HEALTH: &str = "/health";
    pub const FLIGHTS: &str = "/logistics/data/flights";
    pub const FLIGHT_BY_ID: &str = "/logistics/data/flights/:flight_id";
    pub const HISTORICAL: &str = "/logistics/data/historical";
    pub const SUMMARY: &str = "/logistics/data/summary";
    pub const FEEDBACK: &str = "/logistics/feedback";
}
