//! API request types
//!
//! Query strings use the snake_case parameter names of the logistics API.

use loadline_core::{
    FlightQuery, ResolvedFilter, RiskLevel, Route, SortKey, UtilizationClass,
    catalog::{DEFAULT_HISTORY_DAYS, HistoryQuery},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, FieldError};

/// Largest page the flights endpoint returns
pub const MAX_FLIGHTS_LIMIT: u32 = 200;

/// Page size when the caller does not send `limit`
pub const DEFAULT_FLIGHTS_LIMIT: u32 = 100;

/// Most days of history a caller may ask for
pub const MAX_HISTORY_DAYS: usize = 30;

/// Query string of `GET /logistics/data/flights`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlightsQueryParams {
    #[serde(default = "default_flights_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: usize,
    /// low, medium, high or critical
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    /// over, near_capacity, optimal or under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utilization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_to: Option<String>,
    /// YYYY-MM-DD, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    /// YYYY-MM-DD, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_true")]
    pub sort_desc: bool,
}

fn default_flights_limit() -> u32 {
    DEFAULT_FLIGHTS_LIMIT
}

fn default_sort_by() -> String {
    SortKey::default().as_str().to_string()
}

fn default_true() -> bool {
    true
}

fn default_history_days() -> usize {
    DEFAULT_HISTORY_DAYS
}

impl Default for FlightsQueryParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_FLIGHTS_LIMIT,
            offset: 0,
            risk_level: None,
            utilization: None,
            route_from: None,
            route_to: None,
            date_from: None,
            date_to: None,
            sort_by: default_sort_by(),
            sort_desc: true,
        }
    }
}

impl FlightsQueryParams {
    /// Validate and convert into a catalog query
    pub fn to_flight_query(&self) -> Result<FlightQuery, ApiError> {
        let mut fields = Vec::new();

        if self.limit < 1 || self.limit > MAX_FLIGHTS_LIMIT {
            fields.push(FieldError::new(
                "limit",
                format!("must be between 1 and {}", MAX_FLIGHTS_LIMIT),
            ));
        }

        let risk_class = parse_optional::<RiskLevel>("risk_level", &self.risk_level, &mut fields);
        let utilization_class =
            parse_optional::<UtilizationClass>("utilization", &self.utilization, &mut fields);
        let sort_by = match self.sort_by.parse::<SortKey>() {
            Ok(key) => key,
            Err(message) => {
                fields.push(FieldError::new("sort_by", message));
                SortKey::default()
            }
        };

        if !fields.is_empty() {
            return Err(ApiError::validation_with_fields(
                "invalid flight query",
                fields,
            ));
        }

        let filter = ResolvedFilter {
            origin_code: non_empty(&self.route_from),
            destination_code: non_empty(&self.route_to),
            utilization_class,
            risk_class,
            date_from: non_empty(&self.date_from),
            date_to: non_empty(&self.date_to),
            limit: self.limit,
        };

        Ok(FlightQuery::new(filter)
            .sorted_by(sort_by, self.sort_desc)
            .with_offset(self.offset))
    }
}

impl From<&FlightQuery> for FlightsQueryParams {
    /// Client side: the limit is clamped to what the API accepts
    fn from(query: &FlightQuery) -> Self {
        let filter = &query.filter;
        Self {
            limit: filter.limit.clamp(1, MAX_FLIGHTS_LIMIT),
            offset: query.offset,
            risk_level: filter.risk_class.map(|risk| risk.as_str().to_string()),
            utilization: filter
                .utilization_class
                .map(|class| class.as_query_param().to_string()),
            route_from: filter.origin_code.clone(),
            route_to: filter.destination_code.clone(),
            date_from: filter.date_from.clone(),
            date_to: filter.date_to.clone(),
            sort_by: query.sort_by.as_str().to_string(),
            sort_desc: query.descending,
        }
    }
}

/// Query string of `GET /logistics/data/historical`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HistoricalQueryParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_to: Option<String>,
    #[serde(default = "default_history_days")]
    pub days: usize,
    #[serde(default = "default_true")]
    pub include_predictions: bool,
}

impl Default for HistoricalQueryParams {
    fn default() -> Self {
        Self {
            route_from: None,
            route_to: None,
            days: DEFAULT_HISTORY_DAYS,
            include_predictions: true,
        }
    }
}

impl HistoricalQueryParams {
    pub fn for_route(route: Option<&Route>, days: usize) -> Self {
        Self {
            route_from: route.map(|r| r.origin.clone()),
            route_to: route.map(|r| r.destination.clone()),
            days: days.clamp(1, MAX_HISTORY_DAYS),
            include_predictions: true,
        }
    }

    /// Validate and convert; the route applies only when both ends are given
    pub fn to_history_query(&self) -> Result<HistoryQuery, ApiError> {
        if self.days < 1 || self.days > MAX_HISTORY_DAYS {
            return Err(ApiError::validation_with_fields(
                "invalid history query",
                vec![FieldError::new(
                    "days",
                    format!("must be between 1 and {}", MAX_HISTORY_DAYS),
                )],
            ));
        }

        let route = match (non_empty(&self.route_from), non_empty(&self.route_to)) {
            (Some(from), Some(to)) => Some(Route::new(from, to)),
            _ => None,
        };

        Ok(HistoryQuery {
            route,
            days: self.days,
            include_predictions: self.include_predictions,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_optional<T: std::str::FromStr<Err = String>>(
    field: &str,
    value: &Option<String>,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let raw = non_empty(value)?;
    match raw.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(message) => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}
