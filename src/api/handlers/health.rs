use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dtos::responses::HealthResponse;
use crate::state::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs(),
        environment: state.config.environment.clone(),
    })
}
