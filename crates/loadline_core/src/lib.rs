//! Loadline Core - filter resolution and dashboard reconciliation
//!
//! A conversational agent and a flight utilization dashboard share one
//! piece of state: the agent's `activeFilter` intent. This crate turns those
//! intents into concrete filters, decides which updates deserve a refetch,
//! pulls flights and payload history from a [`FlightDataSource`] and keeps
//! the dashboard's [`DisplayState`] and the agent's view of the filter in
//! agreement.

pub mod agent;
pub mod catalog;
pub mod change;
pub mod config;
pub mod display;
pub mod error;
pub mod filter;
pub mod flight;
pub mod history;
pub mod reconcile;
pub mod source;
pub mod tool_status;
pub mod utils;

#[cfg(test)]
mod test_helpers;

// Macros are automatically available at crate root due to #[macro_export]

pub use agent::{AgentSharedState, AgentStateChannel};
pub use catalog::FlightCatalog;
pub use change::{ChangeDecision, IntentSignature, SkipReason};
pub use config::LoadlineConfig;
pub use display::{DisplayAction, DisplayState, SyncStatus};
pub use error::{CoreError, Result};
pub use filter::{FieldIntent, FilterIntent, ResolvedFilter};
pub use flight::{Flight, HistoricalPoint, RiskLevel, Route, UtilizationClass};
pub use reconcile::{CycleOutcome, LookupOutcome, Reconciler};
pub use source::{Feedback, FeedbackReceipt, FlightDataSource, FlightQuery, SortKey, Vote};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        AgentStateChannel, CoreError, CycleOutcome, DisplayState, FieldIntent, FilterIntent,
        Flight, FlightCatalog, FlightDataSource, FlightQuery, HistoricalPoint, LoadlineConfig,
        Reconciler, ResolvedFilter, Result, RiskLevel, Route, SortKey, UtilizationClass,
    };
}
