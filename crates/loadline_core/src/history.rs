//! Route inference and payload history shaping for the chart

use std::collections::HashMap;

use crate::flight::{Flight, HistoricalPoint, Route};

/// Route the chart should be scoped to
///
/// An explicitly selected route wins. Otherwise, if every displayed flight
/// flies the same origin/destination pair, that pair is used. Anything else
/// means the aggregate view.
pub fn infer_route(selected: Option<&Route>, flights: &[Flight]) -> Option<Route> {
    if let Some(route) = selected {
        return Some(route.clone());
    }

    let (first, rest) = flights.split_first()?;
    rest.iter()
        .all(|flight| {
            flight.origin.eq_ignore_ascii_case(&first.origin)
                && flight.destination.eq_ignore_ascii_case(&first.destination)
        })
        .then(|| first.route())
}

/// Sum points that share a date, across all routes
///
/// Dates keep the order in which they first appear. A date is predicted if
/// any point contributing to it was predicted.
pub fn aggregate_by_date(points: &[HistoricalPoint]) -> Vec<HistoricalPoint> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut merged: Vec<HistoricalPoint> = Vec::new();

    for point in points {
        match index.get(point.date.as_str()) {
            Some(&slot) => {
                let entry = &mut merged[slot];
                entry.pounds += point.pounds;
                entry.cubic_feet += point.cubic_feet;
                entry.predicted |= point.predicted;
            }
            None => {
                index.insert(point.date.as_str(), merged.len());
                merged.push(HistoricalPoint {
                    date: point.date.clone(),
                    pounds: point.pounds,
                    cubic_feet: point.cubic_feet,
                    predicted: point.predicted,
                    route: None,
                });
            }
        }
    }

    merged
}

/// Points tagged with exactly this route
pub fn points_for_route(points: &[HistoricalPoint], route: &Route) -> Vec<HistoricalPoint> {
    let label = route.label();
    points
        .iter()
        .filter(|point| point.route.as_deref() == Some(label.as_str()))
        .cloned()
        .collect()
}

/// Series to draw for the given active route
///
/// A route with no history of its own falls back to the aggregate rather
/// than producing an empty chart.
pub fn chart_series(points: &[HistoricalPoint], route: Option<&Route>) -> Vec<HistoricalPoint> {
    if let Some(route) = route {
        let scoped = points_for_route(points, route);
        if !scoped.is_empty() {
            return scoped;
        }
        tracing::debug!("No history for {}, showing aggregate", route);
    }
    aggregate_by_date(points)
}
