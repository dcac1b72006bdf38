use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::CreateProjectRequest;
use crate::api::dtos::responses::Page;
use crate::api::extractors::pagination::{Pagination, PAGINATION_KEYS};
use crate::domain::entity::{Entity, FieldValue, Filter, Patch};
use crate::domain::models::project::{NewProjectParams, Project, PROJECT_VISIBILITIES};
use crate::domain::models::user::User;
use crate::error::AppError;
use crate::state::AppState;

fn check_visibility(visibility: &str) -> Result<(), AppError> {
    if PROJECT_VISIBILITIES.contains(&visibility) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "visibility must be one of: {}",
            PROJECT_VISIBILITIES.join(", ")
        )))
    }
}

pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.project_name.trim().is_empty() {
        return Err(AppError::Validation("Project name must not be empty".into()));
    }
    if let Some(visibility) = &payload.visibility {
        check_visibility(visibility)?;
    }
    if payload.project_settings.as_ref().is_some_and(|s| !s.is_object()) {
        return Err(AppError::Validation("project_settings must be an object".into()));
    }

    state
        .store
        .get::<User>(&payload.owner_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Owner not found".into()))?;

    let project = Project::new(NewProjectParams {
        project_name: payload.project_name,
        description: payload.description,
        visibility: payload.visibility,
        owner_id: payload.owner_id,
        project_settings: payload.project_settings,
    });
    let created = state.store.create(&project).await?;

    info!("Created project: {} owned by {}", created.project_id, created.owner_id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    pagination: Pagination,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let filter = Filter::from_query(Project::DESCRIPTOR, &params, PAGINATION_KEYS)?;
    let items = state.store.list::<Project>(&filter, pagination.skip, pagination.limit).await?;
    let total = state.store.count::<Project>(&filter).await?;
    Ok(Json(Page::new(items, total, pagination)))
}

pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let project = state
        .store
        .get::<Project>(&project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;
    Ok(Json(project))
}

pub async fn update_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
    Json(body): Json<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    let mut patch = Patch::from_json(Project::DESCRIPTOR, body)?;
    match patch.get("visibility") {
        Some(FieldValue::Text(Some(v))) => check_visibility(v)?,
        Some(_) => return Err(AppError::Validation("visibility must not be null".into())),
        None => {}
    }
    if let Some(FieldValue::Json(settings)) = patch.get("project_settings")
        && !settings.is_object()
    {
        return Err(AppError::Validation("project_settings must be an object".into()));
    }
    if !patch.is_empty() {
        patch = patch.set("modified_at", Utc::now());
    }

    let updated = state.store.update::<Project>(&project_id, &patch).await?;
    info!("Updated project: {}", updated.project_id);
    Ok(Json(updated))
}

pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let removed = state
        .store
        .delete::<Project>(&project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;
    info!("Deleted project: {}", removed.project_id);
    Ok(Json(removed))
}

pub async fn list_project_members(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entries = state.members.project_members(&project_id).await?;
    Ok(Json(entries))
}
