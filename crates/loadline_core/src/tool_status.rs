//! Transient status text for agent tool calls
//!
//! The chat widget reports tool invocations as they start and finish. Only
//! the status line shown next to the dashboard depends on them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallStatus {
    Pending,
    Complete,
}

/// A tool invocation reported by the agent runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallEvent {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
    pub status: ToolCallStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// Status line for a tool call, or `None` when nothing should be shown
pub fn status_text(event: &ToolCallEvent) -> Option<String> {
    match event.status {
        ToolCallStatus::Pending => Some(pending_text(event)),
        ToolCallStatus::Complete => event
            .result
            .as_ref()
            .and_then(|result| result.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(format!("{} finished", humanize(&event.name)))),
    }
}

fn pending_text(event: &ToolCallEvent) -> String {
    let count = event.arguments.get("count").and_then(Value::as_u64);
    match event.name.as_str() {
        "get_over_utilized_flights" => counted("Finding over-utilized flights", count),
        "get_under_utilized_flights" => counted("Finding under-utilized flights", count),
        "get_optimal_flights" => counted("Finding optimally loaded flights", count),
        "get_predicted_payload" => counted("Predicting payload for upcoming flights", count),
        "get_utilization_risks" => counted("Scanning flights for utilization risk", count),
        "get_flight_details" => match event.arguments.get("flight_number").and_then(Value::as_str) {
            Some(number) => format!("Looking up flight {}...", number),
            None => "Looking up flight...".to_string(),
        },
        "get_historical_payload" => match event.arguments.get("route").and_then(Value::as_str) {
            Some(route) => format!("Loading payload history for {}...", route),
            None => "Loading payload history...".to_string(),
        },
        "update_flights" => "Updating flight list...".to_string(),
        "update_selected_flight" => "Opening flight details...".to_string(),
        "update_historical_data" => "Updating payload chart...".to_string(),
        other => format!("Running {}...", humanize(other)),
    }
}

fn counted(base: &str, count: Option<u64>) -> String {
    match count {
        Some(count) => format!("{} (top {})...", base, count),
        None => format!("{}...", base),
    }
}

fn humanize(name: &str) -> String {
    name.replace('_', " ")
}
