use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::entity::{Column, ColumnKind, Entity, EntityDescriptor, FieldValue};

pub const NOTIFICATION_TYPES: &[&str] = &["invitation", "file_change", "member_added", "deployment", "mention"];

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Notification {
    pub notification_id: String,
    pub user_id: String,
    pub project_id: Option<String>,
    pub notification_type: String,
    pub title: String,
    pub message: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewNotification {
    pub user_id: String,
    pub project_id: Option<String>,
    pub notification_type: String,
    pub title: String,
    pub message: Option<String>,
}

impl Notification {
    pub fn new(draft: NewNotification) -> Self {
        Self {
            notification_id: Uuid::new_v4().to_string(),
            user_id: draft.user_id,
            project_id: draft.project_id,
            notification_type: draft.notification_type,
            title: draft.title,
            message: draft.message,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}

impl Entity for Notification {
    const DESCRIPTOR: &'static EntityDescriptor = &EntityDescriptor {
        label: "Notification",
        table: "notifications",
        key: "notification_id",
        order_by: "created_at",
        columns: &[
            Column::fixed("notification_id", ColumnKind::Text),
            Column::fixed("user_id", ColumnKind::Text),
            Column::fixed("project_id", ColumnKind::Text),
            Column::fixed("notification_type", ColumnKind::Text),
            Column::fixed("title", ColumnKind::Text),
            Column::fixed("message", ColumnKind::Text),
            Column::editable("is_read", ColumnKind::Bool),
            Column::fixed("created_at", ColumnKind::Timestamp),
        ],
    };

    fn key(&self) -> &str {
        &self.notification_id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.notification_id.clone().into(),
            self.user_id.clone().into(),
            self.project_id.clone().into(),
            self.notification_type.clone().into(),
            self.title.clone().into(),
            self.message.clone().into(),
            self.is_read.into(),
            self.created_at.into(),
        ]
    }
}
