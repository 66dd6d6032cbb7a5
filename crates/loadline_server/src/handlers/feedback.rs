//! Recommendation feedback endpoint

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use loadline_api::{ApiError, Feedback, responses::FeedbackReceipt};

use crate::state::AppState;

pub async fn submit_feedback(
    State(state): State<AppState>,
    payload: Result<Json<Feedback>, JsonRejection>,
) -> Result<Json<FeedbackReceipt>, ApiError> {
    let Json(feedback) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    Ok(Json(state.catalog.record_feedback(&feedback)))
}
