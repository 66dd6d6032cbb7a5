//! In-memory flight catalog
//!
//! Serves the flight data file (`{"flights": [...], "historicalData": [...]}`)
//! with the same filtering, ordering and paging rules as the REST API, so it
//! can back both the HTTP server and offline runs of the reconciler.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    CoreError, Result,
    filter::ResolvedFilter,
    flight::{Flight, HistoricalPoint, RiskLevel, Route},
    source::{Feedback, FeedbackReceipt, FlightDataSource, FlightQuery, SortKey},
};

/// Days of history per route returned when the caller does not say
pub const DEFAULT_HISTORY_DAYS: usize = 10;

/// Contents of a flight data file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightData {
    #[serde(default)]
    pub flights: Vec<Flight>,
    #[serde(default)]
    pub historical_data: Vec<HistoricalPoint>,
}

/// One page of a flight search
#[derive(Debug, Clone, PartialEq)]
pub struct FlightPage {
    pub flights: Vec<Flight>,
    /// Matches before paging
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryQuery {
    pub route: Option<Route>,
    pub days: usize,
    pub include_predictions: bool,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            route: None,
            days: DEFAULT_HISTORY_DAYS,
            include_predictions: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub points: Vec<HistoricalPoint>,
    /// Distinct route labels present before the per-route day cap
    pub routes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskBreakdown {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

/// Counts and statistics over the whole catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary {
    pub total_flights: usize,
    pub risk_breakdown: RiskBreakdown,
    pub average_utilization: f64,
    pub unique_routes: usize,
    pub top_routes: Vec<(String, usize)>,
    pub airports: Vec<String>,
    pub flights_at_risk: usize,
    pub under_utilized_flights: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FlightCatalog {
    data: FlightData,
    history_days: usize,
}

impl FlightCatalog {
    pub fn new(data: FlightData) -> Self {
        Self {
            data,
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }

    /// Days per route used by [`FlightDataSource::query_historical`]
    pub fn with_history_days(mut self, days: usize) -> Self {
        self.history_days = days.max(1);
        self
    }

    /// Load a flight data file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CoreError::data_load_failed(path.display().to_string(), e))?;
        let data: FlightData = serde_json::from_str(&content)
            .map_err(|e| CoreError::data_load_failed(path.display().to_string(), e))?;

        tracing::info!(
            "Loaded {} flights and {} history points from {}",
            data.flights.len(),
            data.historical_data.len(),
            path.display()
        );
        Ok(Self::new(data))
    }

    pub fn flights(&self) -> &[Flight] {
        &self.data.flights
    }

    pub fn historical_data(&self) -> &[HistoricalPoint] {
        &self.data.historical_data
    }

    /// Filter, sort and page flights
    pub fn search(&self, query: &FlightQuery) -> FlightPage {
        let filter = &query.filter;
        let mut matches: Vec<&Flight> = self
            .data
            .flights
            .iter()
            .filter(|flight| matches_filter(flight, filter))
            .collect();

        matches.sort_by(|a, b| {
            let ordering = compare_by(a, b, query.sort_by);
            if query.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });

        let total = matches.len();
        let flights = matches
            .into_iter()
            .skip(query.offset)
            .take(filter.limit as usize)
            .cloned()
            .collect();

        FlightPage { flights, total }
    }

    /// Payload history, scoped to a route or across every route
    ///
    /// Unscoped results keep at most `days` points per route label; scoped
    /// results keep the first `days` points.
    pub fn history(&self, query: &HistoryQuery) -> HistoryPage {
        let label = query.route.as_ref().map(Route::label);
        let mut points: Vec<&HistoricalPoint> = self
            .data
            .historical_data
            .iter()
            .filter(|point| match &label {
                Some(label) => point.route.as_deref() == Some(label.as_str()),
                None => true,
            })
            .filter(|point| query.include_predictions || !point.predicted)
            .collect();

        points.sort_by(|a, b| a.date.cmp(&b.date));

        let routes: Vec<String> = points
            .iter()
            .filter_map(|point| point.route.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let points = if label.is_some() {
            points.into_iter().take(query.days).cloned().collect()
        } else {
            let mut seen: HashMap<&str, usize> = HashMap::new();
            points
                .into_iter()
                .filter(|point| {
                    let key = point.route.as_deref().unwrap_or("aggregate");
                    let count = seen.entry(key).or_insert(0);
                    *count += 1;
                    *count <= query.days
                })
                .cloned()
                .collect()
        };

        HistoryPage { points, routes }
    }

    /// Find a flight by id or by flight number (case and spaces ignored)
    pub fn find(&self, id_or_number: &str) -> Option<&Flight> {
        let normalized = normalize_flight_number(id_or_number);
        self.data.flights.iter().find(|flight| {
            flight.id == id_or_number || flight.flight_number.to_ascii_uppercase() == normalized
        })
    }

    pub fn summary(&self) -> CatalogSummary {
        let flights = &self.data.flights;
        let mut risk = RiskBreakdown::default();
        let mut route_order: Vec<String> = Vec::new();
        let mut route_counts: HashMap<String, usize> = HashMap::new();
        let mut airports: BTreeSet<String> = BTreeSet::new();
        let mut total_utilization = 0.0;

        for flight in flights {
            match flight.risk_level {
                RiskLevel::Low => risk.low += 1,
                RiskLevel::Medium => risk.medium += 1,
                RiskLevel::High => risk.high += 1,
                RiskLevel::Critical => risk.critical += 1,
            }

            let label = flight.route().label();
            let count = route_counts.entry(label.clone()).or_insert_with(|| {
                route_order.push(label);
                0
            });
            *count += 1;

            total_utilization += flight.utilization_percent;
            for code in [&flight.origin, &flight.destination] {
                if !code.is_empty() {
                    airports.insert(code.clone());
                }
            }
        }

        let average_utilization = if flights.is_empty() {
            0.0
        } else {
            (total_utilization / flights.len() as f64 * 10.0).round() / 10.0
        };

        let mut top_routes: Vec<(String, usize)> = route_order
            .into_iter()
            .map(|label| {
                let count = route_counts.get(&label).copied().unwrap_or_default();
                (label, count)
            })
            .collect();
        top_routes.sort_by(|a, b| b.1.cmp(&a.1));
        let unique_routes = top_routes.len();
        top_routes.truncate(10);

        CatalogSummary {
            total_flights: flights.len(),
            flights_at_risk: risk.high + risk.critical,
            under_utilized_flights: risk.low,
            risk_breakdown: risk,
            average_utilization,
            unique_routes,
            top_routes,
            airports: airports.into_iter().collect(),
        }
    }

    /// Acknowledge feedback; it is only logged
    pub fn record_feedback(&self, feedback: &Feedback) -> FeedbackReceipt {
        tracing::info!(
            flight_id = %feedback.flight_id,
            flight_number = %feedback.flight_number,
            timestamp = %feedback.timestamp,
            votes = ?feedback.votes,
            comment = feedback.comment.as_deref().unwrap_or(""),
            "Recommendation feedback received"
        );
        FeedbackReceipt {
            status: "received".to_string(),
            message: "Feedback logged successfully. Thank you!".to_string(),
            flight_number: feedback.flight_number.clone(),
            votes_received: feedback.votes.len(),
        }
    }
}

#[async_trait]
impl FlightDataSource for FlightCatalog {
    async fn query_flights(&self, query: &FlightQuery) -> Result<Vec<Flight>> {
        Ok(self.search(query).flights)
    }

    async fn query_historical(&self, route: Option<&Route>) -> Result<Vec<HistoricalPoint>> {
        Ok(self
            .history(&HistoryQuery {
                route: route.cloned(),
                days: self.history_days,
                include_predictions: true,
            })
            .points)
    }

    async fn flight_by_number(&self, flight_number: &str) -> Result<Option<Flight>> {
        Ok(self.find(flight_number).cloned())
    }

    async fn submit_feedback(&self, feedback: &Feedback) -> Result<FeedbackReceipt> {
        Ok(self.record_feedback(feedback))
    }
}

pub fn normalize_flight_number(number: &str) -> String {
    number
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn matches_filter(flight: &Flight, filter: &ResolvedFilter) -> bool {
    if let Some(risk) = filter.risk_class {
        if flight.risk_level != risk {
            return false;
        }
    }
    if let Some(class) = filter.utilization_class {
        if !class.matches(flight.utilization_percent) {
            return false;
        }
    }
    if let Some(origin) = non_empty(&filter.origin_code) {
        if !flight.origin.eq_ignore_ascii_case(origin) {
            return false;
        }
    }
    if let Some(destination) = non_empty(&filter.destination_code) {
        if !flight.destination.eq_ignore_ascii_case(destination) {
            return false;
        }
    }
    if let Some(from) = non_empty(&filter.date_from) {
        if flight.flight_date.as_str() < from {
            return false;
        }
    }
    if let Some(to) = non_empty(&filter.date_to) {
        if flight.flight_date.as_str() > to {
            return false;
        }
    }
    true
}

fn compare_by(a: &Flight, b: &Flight, key: SortKey) -> Ordering {
    match key {
        SortKey::UtilizationPercent => a.utilization_percent.total_cmp(&b.utilization_percent),
        SortKey::CurrentPounds => a.current_pounds.total_cmp(&b.current_pounds),
        SortKey::CurrentCubicFeet => a.current_cubic_feet.total_cmp(&b.current_cubic_feet),
        SortKey::FlightDate => a.flight_date.cmp(&b.flight_date),
        SortKey::SortTime => a.sort_time.cmp(&b.sort_time),
        SortKey::FlightNumber => a.flight_number.cmp(&b.flight_number),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::UtilizationClass;
    use crate::source::Vote;
    use crate::test_helpers::{flight, point};
    use pretty_assertions::assert_eq;

    fn catalog() -> FlightCatalog {
        let mut late = flight("f4", "LAX", "ORD", 88.0);
        late.flight_date = "2025-01-15".to_string();
        FlightCatalog::new(FlightData {
            flights: vec![
                flight("f1", "LAX", "ORD", 97.0),
                flight("f2", "DFW", "ATL", 30.0),
                flight("f3", "LAX", "JFK", 65.0),
                late,
                flight("f5", "SEA", "BOS", 99.0),
            ],
            historical_data: vec![
                point("2025-01-11", 100.0, 10.0, false, Some("LAX → ORD")),
                point("2025-01-10", 120.0, 12.0, false, Some("LAX → ORD")),
                point("2025-01-10", 80.0, 8.0, false, Some("DFW → ATL")),
                point("2025-01-13", 130.0, 13.0, true, Some("LAX → ORD")),
            ],
        })
    }

    fn numbers(page: &FlightPage) -> Vec<&str> {
        page.flights.iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn search_sorts_by_utilization_descending_by_default() {
        let page = catalog().search(&FlightQuery::new(ResolvedFilter::default()));
        assert_eq!(numbers(&page), vec!["f5", "f1", "f4", "f3", "f2"]);
        assert_eq!(page.total, 5);
    }

    #[test]
    fn search_applies_every_constraint() {
        let filter = ResolvedFilter {
            origin_code: Some("lax".to_string()),
            utilization_class: Some(UtilizationClass::NearCapacity),
            date_from: Some("2025-01-13".to_string()),
            ..Default::default()
        };
        let page = catalog().search(&FlightQuery::new(filter));
        assert_eq!(numbers(&page), vec!["f4"]);
    }

    #[test]
    fn search_pages_after_counting() {
        let filter = ResolvedFilter {
            limit: 2,
            ..Default::default()
        };
        let page = catalog().search(
            &FlightQuery::new(filter)
                .sorted_by(SortKey::FlightNumber, false)
                .with_offset(1),
        );
        assert_eq!(page.total, 5);
        assert_eq!(page.flights.len(), 2);
        assert_eq!(page.flights[0].flight_number, "LAX-JFK-3");
    }

    #[test]
    fn history_scopes_and_caps() {
        let catalog = catalog();
        let scoped = catalog.history(&HistoryQuery {
            route: Some(Route::new("LAX", "ORD")),
            days: 2,
            include_predictions: true,
        });
        let dates: Vec<&str> = scoped.points.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-01-10", "2025-01-11"]);

        let unscoped = catalog.history(&HistoryQuery {
            route: None,
            days: 10,
            include_predictions: false,
        });
        assert_eq!(unscoped.points.len(), 3);
        assert_eq!(unscoped.routes, vec!["DFW → ATL", "LAX → ORD"]);
    }

    #[test]
    fn find_normalizes_flight_numbers() {
        let catalog = catalog();
        assert_eq!(catalog.find("lax-ord-1").map(|f| f.id.as_str()), Some("f1"));
        assert_eq!(catalog.find(" LAX - ORD - 1 ").map(|f| f.id.as_str()), Some("f1"));
        assert_eq!(catalog.find("f3").map(|f| f.id.as_str()), Some("f3"));
        assert!(catalog.find("ZZZ-999").is_none());
    }

    #[test]
    fn summary_counts_risk_and_routes() {
        let summary = catalog().summary();
        assert_eq!(summary.total_flights, 5);
        assert_eq!(summary.risk_breakdown.critical, 2);
        assert_eq!(summary.risk_breakdown.high, 1);
        assert_eq!(summary.flights_at_risk, 3);
        assert_eq!(summary.under_utilized_flights, 1);
        assert_eq!(summary.unique_routes, 4);
        assert_eq!(summary.top_routes[0], ("LAX → ORD".to_string(), 2));
        assert_eq!(summary.average_utilization, 75.8);
        assert_eq!(summary.airports, vec!["ATL", "BOS", "DFW", "JFK", "LAX", "ORD", "SEA"]);
    }

    #[tokio::test]
    async fn feedback_is_acknowledged() {
        let catalog = catalog();
        let feedback = Feedback::new(&catalog.flights()[0])
            .with_vote("rebook", Vote::Up)
            .with_vote("split", Vote::Down);
        let receipt = catalog.submit_feedback(&feedback).await.unwrap();
        assert_eq!(receipt.votes_received, 2);
        assert_eq!(receipt.status, "received");
    }

    #[tokio::test]
    async fn load_reads_data_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flights.json");
        tokio::fs::write(
            &path,
            serde_json::to_string(&FlightData {
                flights: vec![flight("f1", "LAX", "ORD", 97.0)],
                historical_data: vec![],
            })
            .unwrap(),
        )
        .await
        .unwrap();

        let catalog = FlightCatalog::load(&path).await.unwrap();
        assert_eq!(catalog.flights().len(), 1);

        let missing = FlightCatalog::load(&dir.path().join("nope.json")).await;
        assert!(matches!(missing, Err(CoreError::DataLoadFailed { .. })));
    }
}
