use loadline_core::{
    AgentStateChannel, CycleOutcome, FilterIntent, FlightDataSource, LookupOutcome,
    Reconciler, RiskLevel, Route, SortKey, UtilizationClass, Vote, history, source::Feedback,
};
use miette::{Result, miette};
use owo_colors::OwoColorize;

use crate::{data_source::DataSource, output::Output};

/// Filter flags shared by the flight commands
#[derive(Debug, Clone, Default, clap::Args)]
pub struct FilterArgs {
    /// Origin airport code
    #[arg(long)]
    pub from: Option<String>,
    /// Destination airport code
    #[arg(long)]
    pub to: Option<String>,
    /// over, near_capacity, optimal or under
    #[arg(long)]
    pub utilization: Option<UtilizationClass>,
    /// low, medium, high or critical
    #[arg(long)]
    pub risk: Option<RiskLevel>,
    /// First flight date (YYYY-MM-DD)
    #[arg(long)]
    pub date_from: Option<String>,
    /// Last flight date (YYYY-MM-DD)
    #[arg(long)]
    pub date_to: Option<String>,
    /// Maximum number of flights
    #[arg(long)]
    pub limit: Option<u32>,
}

impl FilterArgs {
    /// Flags are a complete intent: anything not given is cleared
    pub fn to_intent(&self) -> FilterIntent {
        FilterIntent {
            origin_code: self.from.clone().into(),
            destination_code: self.to.clone().into(),
            utilization_class: self.utilization.into(),
            risk_class: self.risk.into(),
            date_from: self.date_from.clone().into(),
            date_to: self.date_to.clone().into(),
            limit: self.limit.into(),
        }
    }
}

/// Run one reconciliation cycle for the given filter and show the result
pub async fn list(source: DataSource, filter: &FilterArgs, sort_by: SortKey, descending: bool) -> Result<()> {
    let output = Output::new();
    let reconciler = Reconciler::new(source, AgentStateChannel::new()).with_ordering(sort_by, descending);

    match reconciler.handle_intent(Some(&filter.to_intent())).await {
        CycleOutcome::Failed { message } => return Err(miette!("{}", message)),
        CycleOutcome::Skipped(reason) => {
            output.status(&format!("Nothing to do: {:?}", reason));
            return Ok(());
        }
        CycleOutcome::Applied { .. } => {}
    }

    let state = reconciler.snapshot();
    if let Some(resolved) = &state.resolved_filter {
        output.section(&format!("Flights ({})", resolved.describe()));
    }
    output.flights(&state.records);

    if let Some(route) = state.active_route() {
        output.section(&format!("Payload history for {}", route.label()));
    } else {
        output.section("Payload history (all routes)");
    }
    output.history(&state.chart_points());
    Ok(())
}

pub async fn lookup(source: DataSource, flight_number: &str) -> Result<()> {
    let output = Output::new();
    let reconciler = Reconciler::new(source, AgentStateChannel::new());

    match reconciler.lookup_flight(flight_number).await {
        LookupOutcome::Found(flight) => output.flight_detail(&flight),
        LookupOutcome::NotFound { message } => output.warning(&message),
        LookupOutcome::Failed { message } => return Err(miette!("{}", message)),
    }
    Ok(())
}

/// Payload history for one route, or aggregated across all routes
pub async fn history(source: DataSource, route: Option<Route>) -> Result<()> {
    let output = Output::new();
    let points = source.query_historical(route.as_ref()).await?;

    match &route {
        Some(route) => output.section(&format!("Payload history for {}", route.label())),
        None => output.section("Payload history (all routes, aggregated)"),
    }
    output.history(&history::chart_series(&points, route.as_ref()));
    Ok(())
}

pub async fn summary(source: DataSource) -> Result<()> {
    let output = Output::new();
    let summary = source.summary().await?;

    output.section(&format!("Flight data from {}", source.describe()));
    output.kv("Flights", &summary.total_flights.to_string().bright_white().to_string());
    output.kv(
        "Average utilization",
        &format!("{:.1}%", summary.average_utilization),
    );
    output.kv(
        "At risk (high + critical)",
        &summary.flights_at_risk.to_string().bright_red().to_string(),
    );
    output.kv(
        "Under-utilized (low risk)",
        &summary.under_utilized_flights.to_string(),
    );
    output.kv("Routes", &summary.unique_routes.to_string());
    output.kv("Airports", &summary.airports.join(", "));

    output.section("Busiest routes");
    for (route, count) in &summary.top_routes {
        output.list_item(&format!("{} - {} flights", route.bright_yellow(), count));
    }
    Ok(())
}

/// Vote on mitigation recommendations for a flight
pub async fn feedback(
    source: DataSource,
    flight_number: &str,
    up: &[String],
    down: &[String],
    comment: Option<String>,
) -> Result<()> {
    let output = Output::new();
    let reconciler = Reconciler::new(source, AgentStateChannel::new());

    let flight = match reconciler.lookup_flight(flight_number).await {
        LookupOutcome::Found(flight) => flight,
        LookupOutcome::NotFound { message } | LookupOutcome::Failed { message } => {
            return Err(miette!("{}", message));
        }
    };

    let mut feedback = Feedback::new(&flight);
    for id in up {
        feedback = feedback.with_vote(id.clone(), Vote::Up);
    }
    for id in down {
        feedback = feedback.with_vote(id.clone(), Vote::Down);
    }
    if let Some(comment) = comment {
        feedback = feedback.with_comment(comment);
    }

    if reconciler.submit_feedback(&feedback).await {
        output.success(&format!(
            "Feedback for {} recorded ({} votes)",
            flight.flight_number,
            feedback.votes.len()
        ));
        Ok(())
    } else {
        output.error("Feedback was not recorded; try again");
        Err(miette!("feedback submission failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadline_core::FieldIntent;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_flags_clear_fields() {
        let args = FilterArgs {
            from: Some("LAX".to_string()),
            risk: Some(RiskLevel::High),
            ..Default::default()
        };
        let intent = args.to_intent();
        assert_eq!(intent.origin_code, FieldIntent::Set("LAX".to_string()));
        assert_eq!(intent.risk_class, FieldIntent::Set(RiskLevel::High));
        assert_eq!(intent.destination_code, FieldIntent::Clear);
        assert_eq!(intent.limit, FieldIntent::Clear);
        assert!(!intent.has_sentinels());
    }
}
