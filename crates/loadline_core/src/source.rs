//! The data fetcher seam
//!
//! The reconciler never talks HTTP or reads files itself; it asks a
//! [`FlightDataSource`]. The in-memory [`crate::catalog::FlightCatalog`]
//! and the REST client in `loadline-api` both implement it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    filter::ResolvedFilter,
    flight::{Flight, HistoricalPoint, Route},
};

/// Source of flights, payload history and feedback intake
#[async_trait]
pub trait FlightDataSource: Send + Sync {
    /// Flights matching the query, sorted and truncated to the filter's limit
    async fn query_flights(&self, query: &FlightQuery) -> Result<Vec<Flight>>;

    /// Payload history for one route, or for every route when `None`
    async fn query_historical(&self, route: Option<&Route>) -> Result<Vec<HistoricalPoint>>;

    /// Look up a single flight by its number (or id); `Ok(None)` when unknown
    async fn flight_by_number(&self, flight_number: &str) -> Result<Option<Flight>>;

    /// Record a user's votes on mitigation recommendations
    async fn submit_feedback(&self, feedback: &Feedback) -> Result<FeedbackReceipt>;
}

#[async_trait]
impl<T: FlightDataSource + ?Sized> FlightDataSource for Arc<T> {
    async fn query_flights(&self, query: &FlightQuery) -> Result<Vec<Flight>> {
        (**self).query_flights(query).await
    }

    async fn query_historical(&self, route: Option<&Route>) -> Result<Vec<HistoricalPoint>> {
        (**self).query_historical(route).await
    }

    async fn flight_by_number(&self, flight_number: &str) -> Result<Option<Flight>> {
        (**self).flight_by_number(flight_number).await
    }

    async fn submit_feedback(&self, feedback: &Feedback) -> Result<FeedbackReceipt> {
        (**self).submit_feedback(feedback).await
    }
}

/// Field flights are ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    UtilizationPercent,
    FlightDate,
    SortTime,
    FlightNumber,
    CurrentPounds,
    CurrentCubicFeet,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UtilizationPercent => "utilizationPercent",
            Self::FlightDate => "flightDate",
            Self::SortTime => "sortTime",
            Self::FlightNumber => "flightNumber",
            Self::CurrentPounds => "currentPounds",
            Self::CurrentCubicFeet => "currentCubicFeet",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "utilizationPercent" => Ok(Self::UtilizationPercent),
            "flightDate" => Ok(Self::FlightDate),
            "sortTime" => Ok(Self::SortTime),
            "flightNumber" => Ok(Self::FlightNumber),
            "currentPounds" => Ok(Self::CurrentPounds),
            "currentCubicFeet" => Ok(Self::CurrentCubicFeet),
            other => Err(format!("unknown sort key '{}'", other)),
        }
    }
}

/// A flight query: the resolved filter plus ordering and paging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightQuery {
    pub filter: ResolvedFilter,
    pub sort_by: SortKey,
    pub descending: bool,
    pub offset: usize,
}

impl FlightQuery {
    /// Highest utilization first, from the start
    pub fn new(filter: ResolvedFilter) -> Self {
        Self {
            filter,
            sort_by: SortKey::default(),
            descending: true,
            offset: 0,
        }
    }

    pub fn sorted_by(mut self, key: SortKey, descending: bool) -> Self {
        self.sort_by = key;
        self.descending = descending;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Up,
    Down,
}

/// User feedback on the recommendations shown for a flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub flight_id: String,
    pub flight_number: String,
    /// Recommendation id to vote
    #[serde(default)]
    pub votes: BTreeMap<String, Vote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Feedback {
    pub fn new(flight: &Flight) -> Self {
        Self {
            flight_id: flight.id.clone(),
            flight_number: flight.flight_number.clone(),
            votes: BTreeMap::new(),
            comment: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_vote(mut self, recommendation_id: impl Into<String>, vote: Vote) -> Self {
        self.votes.insert(recommendation_id.into(), vote);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackReceipt {
    pub status: String,
    pub message: String,
    pub flight_number: String,
    pub votes_received: usize,
}
