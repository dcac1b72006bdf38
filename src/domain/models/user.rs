use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::entity::{Column, ColumnKind, Entity, EntityDescriptor, FieldValue};

pub const USER_STATUSES: &[&str] = &["active", "inactive", "suspended"];

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(username: String, email: String, password_hash: String, full_name: Option<String>) -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            username,
            email,
            password_hash,
            full_name,
            avatar_url: None,
            status: "active".to_string(),
            created_at: Utc::now(),
            last_login_at: None,
        }
    }
}

impl Entity for User {
    const DESCRIPTOR: &'static EntityDescriptor = &EntityDescriptor {
        label: "User",
        table: "users",
        key: "user_id",
        order_by: "created_at",
        columns: &[
            Column::fixed("user_id", ColumnKind::Text),
            Column::fixed("username", ColumnKind::Text),
            Column::fixed("email", ColumnKind::Text),
            Column::fixed("password_hash", ColumnKind::Text),
            Column::editable("full_name", ColumnKind::Text),
            Column::editable("avatar_url", ColumnKind::Text),
            Column::editable("status", ColumnKind::Text),
            Column::fixed("created_at", ColumnKind::Timestamp),
            Column::editable("last_login_at", ColumnKind::Timestamp),
        ],
    };

    fn key(&self) -> &str {
        &self.user_id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.user_id.clone().into(),
            self.username.clone().into(),
            self.email.clone().into(),
            self.password_hash.clone().into(),
            self.full_name.clone().into(),
            self.avatar_url.clone().into(),
            self.status.clone().into(),
            self.created_at.into(),
            self.last_login_at.into(),
        ]
    }
}
