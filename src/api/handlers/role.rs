use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::CreateRoleRequest;
use crate::api::dtos::responses::Page;
use crate::api::extractors::pagination::Pagination;
use crate::domain::entity::{Entity, FieldValue, Filter, Patch};
use crate::domain::models::role::{validate_permissions, Role};
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_role(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let role_name = payload.role_name.trim().to_string();
    if role_name.is_empty() {
        return Err(AppError::Validation("Role name must not be empty".into()));
    }
    if let Some(permissions) = &payload.permissions {
        validate_permissions(permissions).map_err(AppError::Validation)?;
    }

    if state.store.find_one::<Role>(&Filter::new().eq("role_name", role_name.as_str())).await?.is_some() {
        return Err(AppError::Conflict("Role name already exists".into()));
    }

    let role = Role::new(role_name, payload.description, payload.permissions);
    let created = state.store.create(&role).await.map_err(|e| match e {
        AppError::UniqueViolation(_) => AppError::Conflict("Role name already exists".into()),
        other => other,
    })?;

    info!("Created role: {} ({})", created.role_name, created.role_id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_roles(
    State(state): State<Arc<AppState>>,
    pagination: Pagination,
) -> Result<impl IntoResponse, AppError> {
    let all = Filter::new();
    let items = state.store.list::<Role>(&all, pagination.skip, pagination.limit).await?;
    let total = state.store.count::<Role>(&all).await?;
    Ok(Json(Page::new(items, total, pagination)))
}

pub async fn get_role(
    State(state): State<Arc<AppState>>,
    Path(role_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let role = state
        .store
        .get::<Role>(&role_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Role not found".into()))?;
    Ok(Json(role))
}

pub async fn update_role(
    State(state): State<Arc<AppState>>,
    Path(role_id): Path<String>,
    Json(body): Json<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    let patch = Patch::from_json(Role::DESCRIPTOR, body)?;
    if let Some(FieldValue::Json(permissions)) = patch.get("permissions") {
        validate_permissions(permissions).map_err(AppError::Validation)?;
    }

    let updated = state.store.update::<Role>(&role_id, &patch).await?;
    info!("Updated role: {}", updated.role_id);
    Ok(Json(updated))
}

pub async fn delete_role(
    State(state): State<Arc<AppState>>,
    Path(role_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let removed = state
        .store
        .delete::<Role>(&role_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Role not found".into()))?;
    info!("Deleted role: {}", removed.role_id);
    Ok(Json(removed))
}
