use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::dtos::requests::{
    AcceptInvitationRequest, CreateInvitationRequest, EmailInvitationParams, InvitationListParams,
};
use crate::api::dtos::responses::Page;
use crate::api::extractors::pagination::Pagination;
use crate::domain::services::admission::{InvitationQuery, NewInvitation};
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_invitation(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateInvitationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = state
        .admission
        .create_invitation(NewInvitation {
            project_id: payload.project_id,
            email: payload.email,
            role_id: payload.role_id,
            invited_by: payload.invited_by,
            user_id: payload.user_id,
            expires_at: payload.expires_at,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_invitations(
    State(state): State<Arc<AppState>>,
    pagination: Pagination,
    Query(params): Query<InvitationListParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = InvitationQuery {
        project_id: params.project_id,
        email: params.email,
        status: params.status,
    };
    let (items, total) = state
        .admission
        .list_invitations(&query, pagination.skip, pagination.limit)
        .await?;
    Ok(Json(Page::new(items, total, pagination)))
}

pub async fn get_invitation(
    State(state): State<Arc<AppState>>,
    Path(invitation_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.admission.get_invitation(&invitation_id).await?))
}

pub async fn get_invitation_by_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.admission.get_invitation_by_token(&token).await?))
}

pub async fn list_invitations_by_email(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
    Query(params): Query<EmailInvitationParams>,
) -> Result<impl IntoResponse, AppError> {
    let pending_only = params.pending_only.unwrap_or(false);
    Ok(Json(state.admission.invitations_for_email(&email, pending_only).await?))
}

pub async fn accept_invitation(
    State(state): State<Arc<AppState>>,
    Path(invitation_id): Path<String>,
    Json(payload): Json<AcceptInvitationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let membership = state
        .admission
        .accept_invitation(&invitation_id, &payload.user_id)
        .await?;
    Ok(Json(membership))
}

pub async fn decline_invitation(
    State(state): State<Arc<AppState>>,
    Path(invitation_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.admission.decline_invitation(&invitation_id).await?))
}

pub async fn delete_invitation(
    State(state): State<Arc<AppState>>,
    Path(invitation_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.admission.delete_invitation(&invitation_id).await?))
}
