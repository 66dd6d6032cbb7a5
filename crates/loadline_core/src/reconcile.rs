//! The reconciliation cycle between agent intents and the dashboard
//!
//! An intent update is gated by the change detector, resolved against the
//! filter currently in effect, fetched from the data source and applied to
//! the display state. The resolved filter is then written back to the
//! agent's shared state.
//!
//! Cycles started from [`Reconciler::run`] are spawned and never cancelled.
//! When two overlap, whichever finishes last wins.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;

use crate::{
    agent::AgentStateChannel,
    change::{self, ChangeDecision, IntentSignature, SkipReason},
    display::{DisplayAction, DisplayState},
    filter::{self, FilterIntent, ResolvedFilter},
    flight::{Flight, Route},
    source::{Feedback, FlightDataSource, FlightQuery, SortKey},
    utils::{error_logging::ErrorLogging, format_duration},
};

/// A cycle that passed the change detector and is ready to fetch
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    pub resolved: ResolvedFilter,
    /// Drop the displayed filter and route once the fetch succeeds
    pub clears_filter: bool,
}

impl Cycle {
    pub fn new(resolved: ResolvedFilter) -> Self {
        Self {
            resolved,
            clears_filter: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Skipped(SkipReason),
    Applied { records: usize },
    /// Fetch failed; previously displayed data was kept
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(Flight),
    /// Shown to the user; display state is untouched
    NotFound { message: String },
    Failed { message: String },
}

pub struct Reconciler<S> {
    source: S,
    agent: AgentStateChannel,
    state: Arc<RwLock<DisplayState>>,
    sort_by: SortKey,
    descending: bool,
}

impl<S> std::fmt::Debug for Reconciler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("sort_by", &self.sort_by)
            .field("descending", &self.descending)
            .field("state", &*self.state.read())
            .finish()
    }
}

impl<S: FlightDataSource + 'static> Reconciler<S> {
    pub fn new(source: S, agent: AgentStateChannel) -> Self {
        Self {
            source,
            agent,
            state: Arc::new(RwLock::new(DisplayState::new())),
            sort_by: SortKey::default(),
            descending: true,
        }
    }

    pub fn with_ordering(mut self, sort_by: SortKey, descending: bool) -> Self {
        self.sort_by = sort_by;
        self.descending = descending;
        self
    }

    pub fn agent(&self) -> &AgentStateChannel {
        &self.agent
    }

    pub fn snapshot(&self) -> DisplayState {
        self.state.read().clone()
    }

    /// Gate an intent and resolve it against the filter in effect
    ///
    /// Runs synchronously so that gating always sees the latest accepted
    /// signature, even while earlier cycles are still fetching.
    pub fn begin(&self, intent: Option<&FilterIntent>) -> Result<Cycle, SkipReason> {
        let mut state = self.state.write();
        let decision = change::evaluate(
            intent,
            state.last_intent_signature.as_ref(),
            state.resolved_filter.as_ref(),
        );

        match decision {
            ChangeDecision::Skip(reason) => {
                tracing::debug!("Skipping intent update: {:?}", reason);
                Err(reason)
            }
            ChangeDecision::Proceed { signature } => {
                let cleared = FilterIntent::cleared();
                let resolved =
                    filter::resolve(intent.unwrap_or(&cleared), state.resolved_filter.as_ref());
                tracing::debug!("Accepted intent {}, resolved to {}", signature, resolved.describe());
                state.apply(DisplayAction::CycleStarted {
                    signature,
                    resolved: resolved.clone(),
                });
                Ok(Cycle::new(resolved))
            }
        }
    }

    /// Fetch for a started cycle and apply the result
    pub async fn execute(&self, cycle: Cycle) -> CycleOutcome {
        let started = Instant::now();
        let Cycle {
            resolved,
            clears_filter,
        } = cycle;
        let query = FlightQuery::new(resolved.clone()).sorted_by(self.sort_by, self.descending);
        let route = resolved.route();

        let fetched = futures::future::try_join(
            self.source.query_flights(&query),
            self.source.query_historical(route.as_ref()),
        )
        .await;

        match fetched {
            Ok((records, historical)) => {
                let count = records.len();
                let signature = IntentSignature::of(Some(&resolved.as_intent()));
                {
                    let mut state = self.state.write();
                    if clears_filter {
                        state.apply(DisplayAction::FilterCleared);
                    }
                    state.apply(DisplayAction::CycleSucceeded {
                        records,
                        historical,
                        resolved: resolved.clone(),
                        signature,
                    });
                }
                // The display state already remembers this signature, so the
                // echo of the write-back is recognized as unchanged.
                self.agent.write_back(&resolved);
                tracing::info!(
                    "Showing {} flights for [{}] after {}",
                    count,
                    resolved.describe(),
                    format_duration(started.elapsed())
                );
                CycleOutcome::Applied { records: count }
            }
            Err(e) => {
                crate::log_warn_chain!("Dashboard refresh failed, keeping current data", e);
                let message = e.one_line();
                self.state
                    .write()
                    .apply(DisplayAction::CycleFailed { message: message.clone() });
                CycleOutcome::Failed { message }
            }
        }
    }

    /// Run one full cycle for an intent, inline
    pub async fn handle_intent(&self, intent: Option<&FilterIntent>) -> CycleOutcome {
        match self.begin(intent) {
            Ok(cycle) => self.execute(cycle).await,
            Err(reason) => CycleOutcome::Skipped(reason),
        }
    }

    /// Consume the agent's shared state until the task is aborted
    pub async fn run(self: Arc<Self>) {
        let mut intents = self.agent.intents();
        while let Some(intent) = intents.next().await {
            if let Ok(cycle) = self.begin(intent.as_ref()) {
                let this = Arc::clone(&self);
                tokio::spawn(async move {
                    this.execute(cycle).await;
                });
            }
        }
    }

    /// Start [`Reconciler::run`] on the runtime; abort the handle on teardown
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Fetch the last accepted filter again, bypassing the change detector
    ///
    /// The agent's shared state is not consulted, so a transient clear
    /// between turns cannot wipe the filter.
    pub async fn retry(&self) -> CycleOutcome {
        let resolved = {
            let mut state = self.state.write();
            state.apply(DisplayAction::RetryStarted);
            state.retry_filter()
        };
        tracing::debug!("Retrying [{}]", resolved.describe());
        self.execute(Cycle::new(resolved)).await
    }

    pub fn select_record(&self, flight: Flight) {
        self.state.write().apply(DisplayAction::SelectRecord(flight));
    }

    pub fn clear_selection(&self) {
        self.state.write().apply(DisplayAction::ClearSelection);
    }

    pub fn select_route(&self, route: Option<Route>) {
        self.state.write().apply(DisplayAction::SelectRoute(route));
    }

    /// Drop every filter from the dashboard and tell the agent
    ///
    /// Nothing is inherited from the previous filter. If the fetch fails the
    /// dashboard keeps its filter and data.
    pub async fn manual_filter_clear(&self) -> CycleOutcome {
        let resolved = filter::resolve(&FilterIntent::cleared(), None);
        self.state.write().apply(DisplayAction::CycleStarted {
            signature: IntentSignature::of(Some(&resolved.as_intent())),
            resolved: resolved.clone(),
        });
        self.execute(Cycle {
            resolved,
            clears_filter: true,
        })
        .await
    }

    /// Look up a flight by number and select it if found
    pub async fn lookup_flight(&self, flight_number: &str) -> LookupOutcome {
        match self.source.flight_by_number(flight_number).await {
            Ok(Some(flight)) => {
                self.select_record(flight.clone());
                LookupOutcome::Found(flight)
            }
            Ok(None) => LookupOutcome::NotFound {
                message: format!("Flight {} not found", flight_number.trim()),
            },
            Err(e) => {
                crate::log_warn_chain!("Flight lookup failed", e);
                LookupOutcome::Failed {
                    message: e.one_line(),
                }
            }
        }
    }

    /// Submit recommendation feedback; `false` lets the user try again
    pub async fn submit_feedback(&self, feedback: &Feedback) -> bool {
        match self.source.submit_feedback(feedback).await {
            Ok(receipt) => {
                tracing::info!(
                    "Feedback for {} accepted ({} votes)",
                    receipt.flight_number,
                    receipt.votes_received
                );
                true
            }
            Err(e) => {
                crate::log_error!("Feedback submission failed", e);
                false
            }
        }
    }

    /// Component teardown: nothing is persisted
    pub fn teardown(&self) {
        self.state.write().apply(DisplayAction::Reset);
    }
}
