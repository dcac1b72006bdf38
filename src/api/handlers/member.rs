use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::dtos::requests::{CreateMemberRequest, UpdateMemberRequest};
use crate::api::dtos::responses::Page;
use crate::api::extractors::pagination::{Pagination, PAGINATION_KEYS};
use crate::domain::entity::{Entity, Filter};
use crate::domain::models::membership::Membership;
use crate::domain::services::membership_service::{MemberUpdate, NewMember};
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_member(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateMemberRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = state
        .members
        .add_member(NewMember {
            project_id: payload.project_id,
            user_id: payload.user_id,
            role_id: payload.role_id,
            invited_by: payload.invited_by,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_members(
    State(state): State<Arc<AppState>>,
    pagination: Pagination,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let filter = Filter::from_query(Membership::DESCRIPTOR, &params, PAGINATION_KEYS)?;
    let (items, total) = state.members.list_members(&filter, pagination.skip, pagination.limit).await?;
    Ok(Json(Page::new(items, total, pagination)))
}

pub async fn get_member(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.members.get_member(&member_id).await?))
}

pub async fn update_member(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<String>,
    Json(payload): Json<UpdateMemberRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state
        .members
        .update_member(
            &member_id,
            MemberUpdate {
                role_id: payload.role_id,
                last_activity: payload.last_activity,
            },
        )
        .await?;
    Ok(Json(updated))
}

pub async fn delete_member(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.members.remove_member(&member_id).await?))
}
