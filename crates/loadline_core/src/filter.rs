//! Filter intents from the agent and their resolution into complete filters
//!
//! The agent describes what it wants to see as a [`FilterIntent`]: every
//! field either keeps the previously effective value, clears the constraint,
//! or sets a new one. [`resolve`] merges an intent with the last
//! [`ResolvedFilter`] and never lets a `Keep` escape into the result.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::flight::{RiskLevel, Route, UtilizationClass};

/// Sentinel the agent writes into a field to mean "keep the previous value"
pub const KEEP_SENTINEL: &str = "__KEEP__";

/// Number of flights requested when neither the intent nor history says otherwise
pub const DEFAULT_LIMIT: u32 = 20;

/// What the agent asks for in one filter field
///
/// On the wire `"__KEEP__"` is [`FieldIntent::Keep`], `null` or a missing
/// field is [`FieldIntent::Clear`], anything else is [`FieldIntent::Set`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldIntent<T> {
    Keep,
    Clear,
    Set(T),
}

impl<T> Default for FieldIntent<T> {
    fn default() -> Self {
        Self::Clear
    }
}

impl<T: Clone> FieldIntent<T> {
    /// Resolve this field against the previously effective value
    pub fn resolve(&self, previous: Option<&T>) -> Option<T> {
        match self {
            Self::Keep => previous.cloned(),
            Self::Clear => None,
            Self::Set(value) => Some(value.clone()),
        }
    }
}

impl<T> FieldIntent<T> {
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

impl<T> From<Option<T>> for FieldIntent<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Set(value),
            None => Self::Clear,
        }
    }
}

impl<T: DeserializeOwned> FieldIntent<T> {
    fn from_json(value: Option<serde_json::Value>) -> Self {
        match value {
            None | Some(serde_json::Value::Null) => Self::Clear,
            Some(serde_json::Value::String(s)) if s == KEEP_SENTINEL => Self::Keep,
            Some(raw) => match serde_json::from_value::<T>(raw.clone()) {
                Ok(value) => Self::Set(value),
                Err(e) => {
                    tracing::warn!("Ignoring unrecognized filter value {}: {}", raw, e);
                    Self::Clear
                }
            },
        }
    }
}

impl<T: Serialize> Serialize for FieldIntent<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Keep => serializer.serialize_str(KEEP_SENTINEL),
            Self::Clear => serializer.serialize_none(),
            Self::Set(value) => value.serialize(serializer),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for FieldIntent<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(Self::from_json(raw))
    }
}

/// A possibly partial filter published by the agent
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterIntent {
    pub origin_code: FieldIntent<String>,
    pub destination_code: FieldIntent<String>,
    pub utilization_class: FieldIntent<UtilizationClass>,
    pub risk_class: FieldIntent<RiskLevel>,
    pub date_from: FieldIntent<String>,
    pub date_to: FieldIntent<String>,
    pub limit: FieldIntent<u32>,
}

impl FilterIntent {
    /// An intent that clears every constraint and inherits nothing
    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn has_sentinels(&self) -> bool {
        self.origin_code.is_keep()
            || self.destination_code.is_keep()
            || self.utilization_class.is_keep()
            || self.risk_class.is_keep()
            || self.date_from.is_keep()
            || self.date_to.is_keep()
            || self.limit.is_keep()
    }
}

/// A complete filter: every field is a value or explicitly absent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedFilter {
    pub origin_code: Option<String>,
    pub destination_code: Option<String>,
    pub utilization_class: Option<UtilizationClass>,
    pub risk_class: Option<RiskLevel>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub limit: u32,
}

impl Default for ResolvedFilter {
    fn default() -> Self {
        Self {
            origin_code: None,
            destination_code: None,
            utilization_class: None,
            risk_class: None,
            date_from: None,
            date_to: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ResolvedFilter {
    /// The single route this filter pins down, if both ends are set
    pub fn route(&self) -> Option<Route> {
        match (self.origin_code.as_deref(), self.destination_code.as_deref()) {
            (Some(origin), Some(destination))
                if !origin.trim().is_empty() && !destination.trim().is_empty() =>
            {
                Some(Route::new(origin, destination))
            }
            _ => None,
        }
    }

    /// Write-back form: the same filter as an intent without sentinels
    pub fn as_intent(&self) -> FilterIntent {
        FilterIntent {
            origin_code: self.origin_code.clone().into(),
            destination_code: self.destination_code.clone().into(),
            utilization_class: self.utilization_class.into(),
            risk_class: self.risk_class.into(),
            date_from: self.date_from.clone().into(),
            date_to: self.date_to.clone().into(),
            limit: FieldIntent::Set(self.limit),
        }
    }

    /// Short human-readable description for logs and status lines
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        match (&self.origin_code, &self.destination_code) {
            (Some(origin), Some(destination)) => parts.push(format!("{} → {}", origin, destination)),
            (Some(origin), None) => parts.push(format!("from {}", origin)),
            (None, Some(destination)) => parts.push(format!("to {}", destination)),
            (None, None) => {}
        }
        if let Some(class) = &self.utilization_class {
            parts.push(format!("utilization {}", class));
        }
        if let Some(risk) = &self.risk_class {
            parts.push(format!("risk {}", risk));
        }
        match (&self.date_from, &self.date_to) {
            (Some(from), Some(to)) => parts.push(format!("{}..{}", from, to)),
            (Some(from), None) => parts.push(format!("from {}", from)),
            (None, Some(to)) => parts.push(format!("until {}", to)),
            (None, None) => {}
        }
        parts.push(format!("limit {}", self.limit));
        parts.join(", ")
    }
}

/// Merge an intent with the previously resolved filter
///
/// `Keep` takes the previous value (absent on the first resolution), `Clear`
/// removes the constraint, `Set` replaces it. `limit` falls back to the
/// previous limit and then to [`DEFAULT_LIMIT`].
pub fn resolve(intent: &FilterIntent, previous: Option<&ResolvedFilter>) -> ResolvedFilter {
    ResolvedFilter {
        origin_code: intent
            .origin_code
            .resolve(previous.and_then(|p| p.origin_code.as_ref())),
        destination_code: intent
            .destination_code
            .resolve(previous.and_then(|p| p.destination_code.as_ref())),
        utilization_class: intent
            .utilization_class
            .resolve(previous.and_then(|p| p.utilization_class.as_ref())),
        risk_class: intent
            .risk_class
            .resolve(previous.and_then(|p| p.risk_class.as_ref())),
        date_from: intent
            .date_from
            .resolve(previous.and_then(|p| p.date_from.as_ref())),
        date_to: intent
            .date_to
            .resolve(previous.and_then(|p| p.date_to.as_ref())),
        limit: intent
            .limit
            .as_set()
            .copied()
            .filter(|limit| *limit > 0)
            .or_else(|| previous.map(|p| p.limit).filter(|limit| *limit > 0))
            .unwrap_or(DEFAULT_LIMIT),
    }
}
