//! CRUD endpoints shared by every [`Resource`] type.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::responses::Page;
use crate::api::extractors::pagination::{Pagination, PAGINATION_KEYS};
use crate::domain::entity::{Filter, Patch};
use crate::domain::services::resources::Resource;
use crate::error::AppError;
use crate::state::AppState;

pub async fn create<R: Resource>(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<R::Draft>,
) -> Result<impl IntoResponse, AppError> {
    let record = R::from_draft(&state.store, draft).await?;
    let created = state.store.create(&record).await.map_err(|e| match e {
        AppError::UniqueViolation(_) => AppError::Conflict(format!("{} already exists", R::DESCRIPTOR.label)),
        other => other,
    })?;
    info!("Created {} {}", R::DESCRIPTOR.table, created.key());
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list<R: Resource>(
    State(state): State<Arc<AppState>>,
    pagination: Pagination,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let filter = Filter::from_query(R::DESCRIPTOR, &params, PAGINATION_KEYS)?;
    let items = state.store.list::<R>(&filter, pagination.skip, pagination.limit).await?;
    let total = state.store.count::<R>(&filter).await?;
    Ok(Json(Page::new(items, total, pagination)))
}

pub async fn get<R: Resource>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let record = state
        .store
        .get::<R>(&id)
        .await?
        .ok_or_else(|| R::DESCRIPTOR.not_found())?;
    Ok(Json(record))
}

pub async fn update<R: Resource>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    let mut patch = Patch::from_json(R::DESCRIPTOR, body)?;
    R::validate_patch(&state.store, &patch).await?;
    if !patch.is_empty() {
        patch = R::stamp(patch);
    }
    let updated = state.store.update::<R>(&id, &patch).await.map_err(|e| match e {
        AppError::UniqueViolation(_) => AppError::Conflict(format!("{} already exists", R::DESCRIPTOR.label)),
        other => other,
    })?;
    info!("Updated {} {}", R::DESCRIPTOR.table, updated.key());
    Ok(Json(updated))
}

pub async fn delete<R: Resource>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let removed = state
        .store
        .delete::<R>(&id)
        .await?
        .ok_or_else(|| R::DESCRIPTOR.not_found())?;
    info!("Deleted {} {}", R::DESCRIPTOR.table, removed.key());
    Ok(Json(removed))
}
