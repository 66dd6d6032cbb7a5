//! Flight records, routes and payload history
//!
//! These are the records the dashboard displays. Utilization and risk are
//! computed by the data source and never recalculated here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A scheduled cargo flight and its current load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: String,
    pub flight_number: String,
    /// Scheduling date, `YYYY-MM-DD`
    pub flight_date: String,
    #[serde(rename = "from")]
    pub origin: String,
    #[serde(rename = "to")]
    pub destination: String,
    pub current_pounds: f64,
    pub max_pounds: f64,
    pub current_cubic_feet: f64,
    pub max_cubic_feet: f64,
    pub utilization_percent: f64,
    pub risk_level: RiskLevel,
    pub sort_time: String,
}

impl Flight {
    pub fn route(&self) -> Route {
        Route::new(&self.origin, &self.destination)
    }

    /// Remaining weight capacity in pounds (negative when overloaded)
    pub fn pounds_headroom(&self) -> f64 {
        self.max_pounds - self.current_pounds
    }

    /// Remaining volume capacity in cubic feet (negative when overloaded)
    pub fn cubic_feet_headroom(&self) -> f64 {
        self.max_cubic_feet - self.current_cubic_feet
    }
}

/// Risk bucket assigned by the data source from utilization thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(format!("unknown risk level '{}'", other)),
        }
    }
}

/// Utilization band used to filter flights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UtilizationClass {
    /// Above 95%
    Over,
    /// 85% to 95% inclusive
    NearCapacity,
    /// At least 50% and below 85%
    Optimal,
    /// Below 50%
    Under,
}

impl UtilizationClass {
    pub fn matches(&self, utilization_percent: f64) -> bool {
        match self {
            Self::Over => utilization_percent > 95.0,
            Self::NearCapacity => (85.0..=95.0).contains(&utilization_percent),
            Self::Optimal => (50.0..85.0).contains(&utilization_percent),
            Self::Under => utilization_percent < 50.0,
        }
    }

    /// Spelling used by the REST query string
    pub fn as_query_param(&self) -> &'static str {
        match self {
            Self::Over => "over",
            Self::NearCapacity => "near_capacity",
            Self::Optimal => "optimal",
            Self::Under => "under",
        }
    }
}

impl fmt::Display for UtilizationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query_param())
    }
}

impl FromStr for UtilizationClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "over" => Ok(Self::Over),
            "nearCapacity" | "near_capacity" => Ok(Self::NearCapacity),
            "optimal" => Ok(Self::Optimal),
            "under" => Ok(Self::Under),
            other => Err(format!("unknown utilization class '{}'", other)),
        }
    }
}

/// An ordered origin/destination pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Route {
    pub origin: String,
    pub destination: String,
}

impl Route {
    pub fn new(origin: impl AsRef<str>, destination: impl AsRef<str>) -> Self {
        Self {
            origin: origin.as_ref().trim().to_ascii_uppercase(),
            destination: destination.as_ref().trim().to_ascii_uppercase(),
        }
    }

    /// Label used to tag historical points, e.g. `LAX → ORD`
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.origin, self.destination)
    }
}

impl FromStr for Route {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace('→', "-").replace("->", "-");
        let parts: Vec<&str> = normalized.split('-').map(str::trim).collect();
        match parts.as_slice() {
            [origin, destination]
                if !origin.is_empty()
                    && !destination.is_empty()
                    && origin.chars().all(|c| c.is_ascii_alphanumeric())
                    && destination.chars().all(|c| c.is_ascii_alphanumeric()) =>
            {
                Ok(Route::new(origin, destination))
            }
            _ => Err(CoreError::invalid_route(s)),
        }
    }
}

impl TryFrom<String> for Route {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Route> for String {
    fn from(route: Route) -> Self {
        route.to_string()
    }
}

/// One day of payload totals, actual or predicted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPoint {
    pub date: String,
    pub pounds: f64,
    pub cubic_feet: f64,
    #[serde(default)]
    pub predicted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn route_parses_all_spellings() {
        let expected = Route::new("LAX", "ORD");
        assert_eq!("LAX → ORD".parse::<Route>().unwrap(), expected);
        assert_eq!("lax-ord".parse::<Route>().unwrap(), expected);
        assert_eq!(" LAX -> ORD ".parse::<Route>().unwrap(), expected);
        assert_eq!(expected.label(), "LAX → ORD");
    }

    #[test]
    fn route_rejects_flight_numbers() {
        assert!("LAX-ORD-2847".parse::<Route>().is_err());
        assert!("LAX".parse::<Route>().is_err());
        assert!("-ORD".parse::<Route>().is_err());
    }

    #[test]
    fn utilization_bands_follow_thresholds() {
        assert!(UtilizationClass::Over.matches(95.5));
        assert!(!UtilizationClass::Over.matches(95.0));
        assert!(UtilizationClass::NearCapacity.matches(95.0));
        assert!(UtilizationClass::NearCapacity.matches(85.0));
        assert!(UtilizationClass::Optimal.matches(50.0));
        assert!(!UtilizationClass::Optimal.matches(85.0));
        assert!(UtilizationClass::Under.matches(49.9));
    }

    #[test]
    fn flight_uses_wire_field_names() {
        let json = serde_json::json!({
            "id": "fl-001",
            "flightNumber": "LAX-ORD-2847",
            "flightDate": "2025-01-12",
            "from": "LAX",
            "to": "ORD",
            "currentPounds": 41000,
            "maxPounds": 45000,
            "currentCubicFeet": 3100,
            "maxCubicFeet": 3400,
            "utilizationPercent": 91.2,
            "riskLevel": "high",
            "sortTime": "2025-01-12T08:00:00Z"
        });
        let flight: Flight = serde_json::from_value(json).unwrap();
        assert_eq!(flight.route(), Route::new("LAX", "ORD"));
        assert_eq!(flight.risk_level, RiskLevel::High);
        assert_eq!(flight.pounds_headroom(), 4000.0);
    }
}
