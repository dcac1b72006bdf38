use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::models::invitation::InvitationStatus;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub project_name: String,
    pub description: Option<String>,
    pub visibility: Option<String>,
    pub owner_id: String,
    pub project_settings: Option<Value>,
}

#[derive(Deserialize)]
pub struct CreateRoleRequest {
    pub role_name: String,
    pub description: Option<String>,
    pub permissions: Option<Value>,
}

#[derive(Deserialize)]
pub struct CreateMemberRequest {
    pub project_id: String,
    pub user_id: String,
    pub role_id: String,
    pub invited_by: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateMemberRequest {
    pub role_id: Option<String>,
    pub last_activity: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct CreateInvitationRequest {
    pub project_id: String,
    pub email: String,
    pub role_id: String,
    pub invited_by: String,
    pub user_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct AcceptInvitationRequest {
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct InvitationListParams {
    pub project_id: Option<String>,
    pub email: Option<String>,
    pub status: Option<InvitationStatus>,
}

#[derive(Deserialize)]
pub struct EmailInvitationParams {
    pub pending_only: Option<bool>,
}
