//! Replay a recorded agent session through the reconciler
//!
//! Each line of the input is one JSON event: a full agent shared-state
//! snapshot, a tool call notification or a user action on the dashboard.
//! Blank lines and lines starting with `#` are skipped.

use std::path::Path;

use loadline_core::{
    AgentSharedState, CycleOutcome, FlightDataSource, LookupOutcome, Reconciler, Route,
    tool_status::{self, ToolCallEvent},
};
use miette::{IntoDiagnostic, Result, miette};
use owo_colors::OwoColorize;
use serde::Deserialize;

use crate::output::Output;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayEvent {
    /// The agent rewrote its shared state
    State { state: AgentSharedState },
    Tool { event: ToolCallEvent },
    SelectRoute {
        #[serde(default)]
        route: Option<Route>,
    },
    Lookup { flight_number: String },
    ClearSelection,
    ClearFilter,
}

/// What one event did
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayStep {
    Cycle(CycleOutcome),
    ToolStatus(Option<String>),
    Lookup(LookupOutcome),
    Selection,
}

pub fn parse_events(content: &str) -> Result<Vec<ReplayEvent>> {
    content
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| {
            serde_json::from_str(line).map_err(|e| miette!("line {}: {}", number, e))
        })
        .collect()
}

pub async fn apply<S: FlightDataSource + 'static>(
    reconciler: &Reconciler<S>,
    event: ReplayEvent,
) -> ReplayStep {
    match event {
        ReplayEvent::State { state } => {
            reconciler.agent().replace(state);
            let intent = reconciler.agent().active_filter();
            ReplayStep::Cycle(reconciler.handle_intent(intent.as_ref()).await)
        }
        ReplayEvent::Tool { event } => ReplayStep::ToolStatus(tool_status::status_text(&event)),
        ReplayEvent::SelectRoute { route } => {
            reconciler.select_route(route);
            ReplayStep::Selection
        }
        ReplayEvent::Lookup { flight_number } => {
            ReplayStep::Lookup(reconciler.lookup_flight(&flight_number).await)
        }
        ReplayEvent::ClearSelection => {
            reconciler.clear_selection();
            ReplayStep::Selection
        }
        ReplayEvent::ClearFilter => ReplayStep::Cycle(reconciler.manual_filter_clear().await),
    }
}

pub async fn run<S: FlightDataSource + 'static>(
    reconciler: Reconciler<S>,
    path: &Path,
) -> Result<()> {
    let output = Output::new();
    let content = tokio::fs::read_to_string(path).await.into_diagnostic()?;
    let events = parse_events(&content)?;

    output.section(&format!("Replaying {} events from {}", events.len(), path.display()));

    for (index, event) in events.into_iter().enumerate() {
        let label = format!("[{}]", index + 1);
        match apply(&reconciler, event).await {
            ReplayStep::Cycle(CycleOutcome::Applied { records }) => {
                let filter = reconciler
                    .snapshot()
                    .resolved_filter
                    .map(|f| f.describe())
                    .unwrap_or_default();
                output.info(&label, &format!("{} flights for {}", records, filter));
            }
            ReplayStep::Cycle(CycleOutcome::Skipped(reason)) => {
                output.info(&label, &format!("skipped ({:?})", reason).dimmed().to_string());
            }
            ReplayStep::Cycle(CycleOutcome::Failed { message }) => {
                output.error(&format!("{} refresh failed: {}", label, message));
            }
            ReplayStep::ToolStatus(Some(text)) => output.info(&label, &text.italic().to_string()),
            ReplayStep::ToolStatus(None) => {}
            ReplayStep::Lookup(LookupOutcome::Found(flight)) => {
                output.info(&label, &format!("selected {}", flight.flight_number));
            }
            ReplayStep::Lookup(LookupOutcome::NotFound { message })
            | ReplayStep::Lookup(LookupOutcome::Failed { message }) => output.warning(&message),
            ReplayStep::Selection => output.info(&label, "selection changed"),
        }
    }

    let state = reconciler.snapshot();
    output.section("Dashboard");
    output.sync_status(&state.sync);
    output.flights(&state.records);
    if let Some(flight) = &state.selected_record {
        output.flight_detail(flight);
    }
    if let Some(route) = state.active_route() {
        output.section(&format!("Payload history for {}", route.label()));
    } else {
        output.section("Payload history (all routes)");
    }
    output.history(&state.chart_points());

    output.section("Agent shared state");
    println!(
        "{}",
        serde_json::to_string_pretty(&reconciler.agent().snapshot()).into_diagnostic()?
    );

    reconciler.teardown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadline_core::{AgentStateChannel, FlightCatalog, SkipReason, catalog::FlightData};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn catalog() -> FlightCatalog {
        let flight = |id: &str, number: &str, from: &str, to: &str, utilization: f64, risk: &str| {
            json!({
                "id": id,
                "flightNumber": number,
                "flightDate": "2025-01-12",
                "from": from,
                "to": to,
                "currentPounds": 40000.0,
                "maxPounds": 45000.0,
                "currentCubicFeet": 3000.0,
                "maxCubicFeet": 3400.0,
                "utilizationPercent": utilization,
                "riskLevel": risk,
                "sortTime": "2025-01-12T08:00:00Z"
            })
        };
        let data: FlightData = serde_json::from_value(json!({
            "flights": [
                flight("f1", "LAX-ORD-2847", "LAX", "ORD", 97.5, "critical"),
                flight("f2", "LAX-JFK-0042", "LAX", "JFK", 96.0, "critical"),
                flight("f3", "DFW-ORD-0310", "DFW", "ORD", 99.0, "critical"),
            ],
            "historicalData": []
        }))
        .unwrap();
        FlightCatalog::new(data)
    }

    const SESSION: &str = r#"
# agent asks for the worst offenders
{"type": "tool", "event": {"name": "get_over_utilized_flights", "arguments": {"count": 10}, "status": "pending"}}
{"type": "state", "state": {"activeFilter": {"utilizationClass": "over", "limit": 10}}}
{"type": "state", "state": {"activeFilter": {"utilizationClass": "over", "limit": 10}, "viewMode": "chart"}}
{"type": "state", "state": {"activeFilter": null}}
{"type": "state", "state": {"activeFilter": {"originCode": "LAX", "utilizationClass": "__KEEP__"}}}
{"type": "state", "state": {"activeFilter": {"originCode": "__KEEP__", "destinationCode": "ORD", "utilizationClass": "__KEEP__", "limit": "__KEEP__"}}}
{"type": "lookup", "flight_number": "lax-ord-2847"}
"#;

    #[test]
    fn session_parses_and_skips_comments() {
        let events = parse_events(SESSION).unwrap();
        assert_eq!(events.len(), 7);
        assert!(matches!(events[0], ReplayEvent::Tool { .. }));

        let err = parse_events("{\"type\": \"state\"}\n{oops").unwrap_err();
        assert!(err.to_string().starts_with("line 1:"));
    }

    #[tokio::test]
    async fn session_follows_dashboard_rules() {
        let reconciler = Reconciler::new(catalog(), AgentStateChannel::new());
        let mut steps = Vec::new();
        for event in parse_events(SESSION).unwrap() {
            steps.push(apply(&reconciler, event).await);
        }

        assert_eq!(
            steps[0],
            ReplayStep::ToolStatus(Some("Finding over-utilized flights (top 10)...".to_string()))
        );
        assert_eq!(steps[1], ReplayStep::Cycle(CycleOutcome::Applied { records: 3 }));
        // Unrelated key changed, filter did not
        assert_eq!(steps[2], ReplayStep::Cycle(CycleOutcome::Skipped(SkipReason::Unchanged)));
        assert_eq!(
            steps[3],
            ReplayStep::Cycle(CycleOutcome::Skipped(SkipReason::TransientClear))
        );
        assert_eq!(steps[4], ReplayStep::Cycle(CycleOutcome::Applied { records: 2 }));
        assert_eq!(steps[5], ReplayStep::Cycle(CycleOutcome::Applied { records: 1 }));
        assert!(matches!(steps[6], ReplayStep::Lookup(LookupOutcome::Found(ref f)) if f.id == "f1"));

        let state = reconciler.snapshot();
        let resolved = state.resolved_filter.as_ref().unwrap();
        assert_eq!(resolved.origin_code.as_deref(), Some("LAX"));
        assert_eq!(resolved.destination_code.as_deref(), Some("ORD"));
        assert_eq!(resolved.limit, 10);
        assert_eq!(state.active_route(), Some(Route::new("LAX", "ORD")));
        assert_eq!(reconciler.agent().snapshot().extra.get("viewMode"), None);
    }
}
