#![cfg(test)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::{
    CoreError, Result,
    flight::{Flight, HistoricalPoint, RiskLevel, Route},
    source::{Feedback, FeedbackReceipt, FlightDataSource, FlightQuery},
};

pub fn flight(id: &str, origin: &str, destination: &str, utilization: f64) -> Flight {
    let risk_level = if utilization > 95.0 {
        RiskLevel::Critical
    } else if utilization >= 80.0 {
        RiskLevel::High
    } else if utilization >= 50.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };
    Flight {
        id: id.to_string(),
        flight_number: format!("{}-{}-{}", origin, destination, id.trim_start_matches('f')),
        flight_date: "2025-01-12".to_string(),
        origin: origin.to_string(),
        destination: destination.to_string(),
        current_pounds: 450.0 * utilization,
        max_pounds: 45_000.0,
        current_cubic_feet: 34.0 * utilization,
        max_cubic_feet: 3_400.0,
        utilization_percent: utilization,
        risk_level,
        sort_time: "2025-01-12T08:00:00Z".to_string(),
    }
}

pub fn point(
    date: &str,
    pounds: f64,
    cubic_feet: f64,
    predicted: bool,
    route: Option<&str>,
) -> HistoricalPoint {
    HistoricalPoint {
        date: date.to_string(),
        pounds,
        cubic_feet,
        predicted,
        route: route.map(str::to_string),
    }
}

/// Scripted data source that records every call it receives
#[derive(Debug, Default)]
pub struct ScriptedSource {
    pub flights: Mutex<VecDeque<Result<Vec<Flight>>>>,
    pub historical: Mutex<Vec<HistoricalPoint>>,
    pub catalog: Mutex<Vec<Flight>>,
    pub fail_feedback: bool,
    pub flight_queries: Mutex<Vec<FlightQuery>>,
    pub historical_queries: Mutex<Vec<Option<Route>>>,
    pub feedback: Mutex<Vec<Feedback>>,
    /// Holds the next flight query open until notified
    pub gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_flights(&self, flights: Vec<Flight>) {
        self.flights.lock().push_back(Ok(flights));
    }

    pub fn push_failure(&self, message: &str) {
        self.flights
            .lock()
            .push_back(Err(CoreError::fetch_failed_msg("query_flights", message)));
    }

    /// The next flight query takes its scripted result, then waits on the
    /// returned gate before answering
    pub fn hold_next_query(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(Arc::clone(&gate));
        gate
    }
}

#[async_trait]
impl FlightDataSource for ScriptedSource {
    async fn query_flights(&self, query: &FlightQuery) -> Result<Vec<Flight>> {
        self.flight_queries.lock().push(query.clone());
        let result = self.flights.lock().pop_front().unwrap_or_else(|| Ok(Vec::new()));
        let gate = self.gate.lock().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        result
    }

    async fn query_historical(&self, route: Option<&Route>) -> Result<Vec<HistoricalPoint>> {
        self.historical_queries.lock().push(route.cloned());
        Ok(self.historical.lock().clone())
    }

    async fn flight_by_number(&self, flight_number: &str) -> Result<Option<Flight>> {
        Ok(self
            .catalog
            .lock()
            .iter()
            .find(|flight| flight.flight_number.eq_ignore_ascii_case(flight_number))
            .cloned())
    }

    async fn submit_feedback(&self, feedback: &Feedback) -> Result<FeedbackReceipt> {
        if self.fail_feedback {
            return Err(CoreError::fetch_failed_msg("submit_feedback", "service unavailable"));
        }
        self.feedback.lock().push(feedback.clone());
        Ok(FeedbackReceipt {
            status: "received".to_string(),
            message: "Feedback logged successfully. Thank you!".to_string(),
            flight_number: feedback.flight_number.clone(),
            votes_received: feedback.votes.len(),
        })
    }
}
