//! Flight data endpoints

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::QueryRejection,
    },
};
use loadline_api::{
    ApiError,
    requests::{FlightsQueryParams, HistoricalQueryParams},
    responses::{CatalogSummary, FlightLookupResponse, FlightsResponse, HistoricalResponse},
};

use crate::state::AppState;

pub async fn list_flights(
    State(state): State<AppState>,
    params: Result<Query<FlightsQueryParams>, QueryRejection>,
) -> Result<Json<FlightsResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::validation(e.body_text()))?;
    let query = params.to_flight_query()?;
    let page = state.catalog.search(&query);

    tracing::debug!(
        "Flight search returned {} of {} matches",
        page.flights.len(),
        page.total
    );

    Ok(Json(FlightsResponse {
        flights: page.flights,
        total: page.total,
        query: params,
    }))
}

/// Unknown flights are a 200 with an error line, like the lookup tool expects
pub async fn get_flight(
    State(state): State<AppState>,
    Path(flight_id): Path<String>,
) -> Json<FlightLookupResponse> {
    match state.catalog.find(&flight_id) {
        Some(flight) => Json(FlightLookupResponse::found(flight.clone())),
        None => Json(FlightLookupResponse::missing(&flight_id)),
    }
}

pub async fn historical(
    State(state): State<AppState>,
    params: Result<Query<HistoricalQueryParams>, QueryRejection>,
) -> Result<Json<HistoricalResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::validation(e.body_text()))?;
    let page = state.catalog.history(&params.to_history_query()?);

    Ok(Json(HistoricalResponse {
        total: page.points.len(),
        historical_data: page.points,
        routes: page.routes,
        query: params,
    }))
}

pub async fn summary(State(state): State<AppState>) -> Json<CatalogSummary> {
    Json(state.catalog.summary())
}
