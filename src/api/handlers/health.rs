use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::api::dtos::responses::HealthResponse;
use crate::error::AppError;
use crate::state::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    state.store.ping().await?;
    Ok(Json(HealthResponse { status: "ok" }))
}
