//! Health check endpoint

use axum::{Json, extract::State};
use loadline_api::responses::HealthResponse;

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        flights_loaded: state.catalog.flights().len(),
    })
}
