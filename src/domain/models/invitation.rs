use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use thiserror::Error;

use crate::domain::entity::{Column, ColumnKind, Entity, EntityDescriptor, FieldValue};
use crate::domain::models::project::Project;
use crate::domain::models::role::Role;
use crate::domain::models::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
            InvitationStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, InvitationStatus::Pending)
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
#[error("unknown invitation status '{0}'")]
pub struct UnknownStatus(String);

impl FromStr for InvitationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvitationStatus::Pending),
            "accepted" => Ok(InvitationStatus::Accepted),
            "declined" => Ok(InvitationStatus::Declined),
            "expired" => Ok(InvitationStatus::Expired),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl From<InvitationStatus> for FieldValue {
    fn from(status: InvitationStatus) -> Self {
        FieldValue::Text(Some(status.as_str().to_string()))
    }
}

// Stored as TEXT on both backends.
impl<DB: sqlx::Database> sqlx::Type<DB> for InvitationStatus
where
    String: sqlx::Type<DB>,
{
    fn type_info() -> DB::TypeInfo {
        <String as sqlx::Type<DB>>::type_info()
    }

    fn compatible(ty: &DB::TypeInfo) -> bool {
        <String as sqlx::Type<DB>>::compatible(ty)
    }
}

impl<'r, DB: sqlx::Database> sqlx::Decode<'r, DB> for InvitationStatus
where
    String: sqlx::Decode<'r, DB>,
{
    fn decode(value: <DB as sqlx::Database>::ValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <String as sqlx::Decode<'r, DB>>::decode(value)?;
        Ok(raw.parse::<InvitationStatus>()?)
    }
}

/// Operation attempted on an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationAction {
    Accept,
    Decline,
    Expire,
    Open,
}

impl InvitationAction {
    pub fn verb(&self) -> &'static str {
        match self {
            InvitationAction::Accept => "accept",
            InvitationAction::Decline => "decline",
            InvitationAction::Expire => "expire",
            InvitationAction::Open => "open",
        }
    }
}

impl fmt::Display for InvitationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Invitation {
    pub invitation_id: String,
    pub project_id: String,
    pub email: String,
    pub user_id: Option<String>,
    pub role_id: String,
    pub invited_by: String,
    pub token: String,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

/// An invitation with the records it points at, as shown to the invitee.
#[derive(Debug, Serialize)]
pub struct InvitationDetails {
    #[serde(flatten)]
    pub invitation: Invitation,
    pub project: Project,
    pub role: Role,
    pub inviter: User,
}

pub struct NewInvitationParams {
    pub project_id: String,
    pub email: String,
    pub user_id: Option<String>,
    pub role_id: String,
    pub invited_by: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Invitation {
    pub fn new(params: NewInvitationParams) -> Self {
        Self {
            invitation_id: Uuid::new_v4().to_string(),
            project_id: params.project_id,
            email: params.email,
            user_id: params.user_id,
            role_id: params.role_id,
            invited_by: params.invited_by,
            token: params.token,
            status: InvitationStatus::Pending,
            created_at: params.created_at,
            expires_at: params.expires_at,
            accepted_at: None,
        }
    }
}

impl Entity for Invitation {
    const DESCRIPTOR: &'static EntityDescriptor = &EntityDescriptor {
        label: "Invitation",
        table: "project_invitations",
        key: "invitation_id",
        order_by: "created_at",
        columns: &[
            Column::fixed("invitation_id", ColumnKind::Text),
            Column::fixed("project_id", ColumnKind::Text),
            Column::fixed("email", ColumnKind::Text),
            Column::fixed("user_id", ColumnKind::Text),
            Column::fixed("role_id", ColumnKind::Text),
            Column::fixed("invited_by", ColumnKind::Text),
            Column::fixed("token", ColumnKind::Text),
            Column::fixed("status", ColumnKind::Text),
            Column::fixed("created_at", ColumnKind::Timestamp),
            Column::fixed("expires_at", ColumnKind::Timestamp),
            Column::fixed("accepted_at", ColumnKind::Timestamp),
        ],
    };

    fn key(&self) -> &str {
        &self.invitation_id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.invitation_id.clone().into(),
            self.project_id.clone().into(),
            self.email.clone().into(),
            self.user_id.clone().into(),
            self.role_id.clone().into(),
            self.invited_by.clone().into(),
            self.token.clone().into(),
            self.status.into(),
            self.created_at.into(),
            self.expires_at.into(),
            self.accepted_at.into(),
        ]
    }
}
