//! What the dashboard is currently showing
//!
//! [`DisplayState`] belongs to the presentation layer. It changes only
//! through [`DisplayState::apply`], which is called by the reconciliation
//! cycle and by explicit user selection.

use serde::{Deserialize, Serialize};

use crate::{
    change::IntentSignature,
    filter::ResolvedFilter,
    flight::{Flight, HistoricalPoint, Route},
    history,
};

/// Progress of the most recent reconciliation cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SyncStatus {
    #[default]
    Idle,
    Fetching,
    /// Last cycle failed; the data on screen is from an earlier cycle
    Failed { message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayState {
    pub records: Vec<Flight>,
    pub historical: Vec<HistoricalPoint>,
    pub resolved_filter: Option<ResolvedFilter>,
    pub selected_record: Option<Flight>,
    pub selected_route: Option<Route>,
    pub last_intent_signature: Option<IntentSignature>,
    /// Filter of the latest accepted cycle that has not completed yet
    pub pending_filter: Option<ResolvedFilter>,
    pub sync: SyncStatus,
}

/// Every mutation the dashboard state accepts
#[derive(Debug, Clone)]
pub enum DisplayAction {
    /// A cycle passed the change detector; remember its intent
    CycleStarted {
        signature: IntentSignature,
        resolved: ResolvedFilter,
    },
    /// The pending cycle is fetched again; the remembered intent stays
    RetryStarted,
    CycleSucceeded {
        records: Vec<Flight>,
        historical: Vec<HistoricalPoint>,
        resolved: ResolvedFilter,
        /// Signature of the filter as written back to the agent
        signature: IntentSignature,
    },
    CycleFailed { message: String },
    SelectRecord(Flight),
    ClearSelection,
    SelectRoute(Option<Route>),
    /// The user dropped every filter from the dashboard; applied together
    /// with the `CycleSucceeded` of the clearing fetch
    FilterCleared,
    /// Component teardown
    Reset,
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, action: DisplayAction) {
        match action {
            DisplayAction::CycleStarted {
                signature,
                resolved,
            } => {
                self.last_intent_signature = Some(signature);
                self.pending_filter = Some(resolved);
                self.sync = SyncStatus::Fetching;
            }
            DisplayAction::RetryStarted => {
                self.sync = SyncStatus::Fetching;
            }
            DisplayAction::CycleSucceeded {
                records,
                historical,
                resolved,
                signature,
            } => {
                self.records = records;
                self.historical = historical;
                self.resolved_filter = Some(resolved);
                // A new filter invalidates whatever was selected under the old one
                self.selected_record = None;
                self.last_intent_signature = Some(signature);
                self.pending_filter = None;
                self.sync = SyncStatus::Idle;
            }
            DisplayAction::CycleFailed { message } => {
                self.sync = SyncStatus::Failed { message };
            }
            DisplayAction::SelectRecord(flight) => {
                self.selected_record = Some(flight);
            }
            DisplayAction::ClearSelection => {
                self.selected_record = None;
            }
            DisplayAction::SelectRoute(route) => {
                self.selected_route = route;
            }
            DisplayAction::FilterCleared => {
                self.resolved_filter = None;
                self.selected_route = None;
                self.selected_record = None;
            }
            DisplayAction::Reset => {
                *self = Self::default();
            }
        }
    }

    /// Route the chart is scoped to, explicit or inferred from the records
    pub fn active_route(&self) -> Option<Route> {
        history::infer_route(self.selected_route.as_ref(), &self.records)
    }

    /// Points to plot for the active route
    pub fn chart_points(&self) -> Vec<HistoricalPoint> {
        history::chart_series(&self.historical, self.active_route().as_ref())
    }

    /// Filter a manual retry fetches: the pending one, else the one shown
    pub fn retry_filter(&self) -> ResolvedFilter {
        self.pending_filter
            .clone()
            .or_else(|| self.resolved_filter.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{flight, point};
    use pretty_assertions::assert_eq;

    fn succeeded(records: Vec<Flight>, historical: Vec<HistoricalPoint>) -> DisplayAction {
        let resolved = ResolvedFilter::default();
        DisplayAction::CycleSucceeded {
            signature: IntentSignature::of(Some(&resolved.as_intent())),
            records,
            historical,
            resolved,
        }
    }

    #[test]
    fn success_replaces_data_and_clears_selection() {
        let mut state = DisplayState::new();
        state.apply(DisplayAction::SelectRecord(flight("f9", "SEA", "BOS", 60.0)));
        state.apply(succeeded(vec![flight("f1", "LAX", "ORD", 91.0)], vec![]));

        assert_eq!(state.records.len(), 1);
        assert_eq!(state.selected_record, None);
        assert_eq!(state.resolved_filter, Some(ResolvedFilter::default()));
        assert_eq!(state.sync, SyncStatus::Idle);
    }

    #[test]
    fn failure_keeps_previous_data() {
        let mut state = DisplayState::new();
        state.apply(succeeded(
            vec![flight("f1", "LAX", "ORD", 91.0)],
            vec![point("01/12", 100.0, 10.0, false, Some("LAX → ORD"))],
        ));
        state.apply(DisplayAction::CycleFailed {
            message: "timeout".to_string(),
        });

        assert_eq!(state.records.len(), 1);
        assert_eq!(state.historical.len(), 1);
        assert_eq!(
            state.sync,
            SyncStatus::Failed {
                message: "timeout".to_string()
            }
        );
    }

    #[test]
    fn chart_follows_inferred_route() {
        let mut state = DisplayState::new();
        state.apply(succeeded(
            vec![
                flight("f1", "LAX", "ORD", 91.0),
                flight("f2", "LAX", "ORD", 45.0),
            ],
            vec![
                point("01/12", 100.0, 10.0, false, Some("LAX → ORD")),
                point("01/12", 200.0, 20.0, false, Some("DFW → ATL")),
            ],
        ));
        assert_eq!(state.active_route(), Some(Route::new("LAX", "ORD")));
        assert_eq!(state.chart_points()[0].pounds, 100.0);

        state.apply(DisplayAction::SelectRoute(Some(Route::new("DFW", "ATL"))));
        assert_eq!(state.chart_points()[0].pounds, 200.0);
    }

    #[test]
    fn filter_cleared_drops_filter_and_selections() {
        let mut state = DisplayState::new();
        state.apply(succeeded(vec![flight("f1", "LAX", "ORD", 91.0)], vec![]));
        state.apply(DisplayAction::SelectRoute(Some(Route::new("LAX", "ORD"))));
        state.apply(DisplayAction::SelectRecord(flight("f1", "LAX", "ORD", 91.0)));
        state.apply(DisplayAction::FilterCleared);

        assert_eq!(state.resolved_filter, None);
        assert_eq!(state.selected_route, None);
        assert_eq!(state.selected_record, None);
        assert_eq!(state.records.len(), 1);
    }

    #[test]
    fn retry_prefers_pending_filter() {
        let mut state = DisplayState::new();
        assert_eq!(state.retry_filter(), ResolvedFilter::default());

        state.apply(succeeded(vec![], vec![]));
        let narrower = ResolvedFilter {
            origin_code: Some("LAX".to_string()),
            ..Default::default()
        };
        state.apply(DisplayAction::CycleStarted {
            signature: IntentSignature::of(Some(&narrower.as_intent())),
            resolved: narrower.clone(),
        });
        state.apply(DisplayAction::CycleFailed {
            message: "timeout".to_string(),
        });
        assert_eq!(state.retry_filter(), narrower);

        state.apply(DisplayAction::RetryStarted);
        assert_eq!(state.sync, SyncStatus::Fetching);
        assert_eq!(
            state.last_intent_signature,
            Some(IntentSignature::of(Some(&narrower.as_intent())))
        );

        state.apply(succeeded(vec![], vec![]));
        assert_eq!(state.pending_filter, None);
        assert_eq!(state.retry_filter(), ResolvedFilter::default());
    }

    #[test]
    fn reset_empties_everything() {
        let mut state = DisplayState::new();
        state.apply(succeeded(vec![flight("f1", "LAX", "ORD", 91.0)], vec![]));
        state.apply(DisplayAction::Reset);
        assert_eq!(state, DisplayState::default());
    }
}
