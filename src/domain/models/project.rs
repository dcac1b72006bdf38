use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};

use crate::domain::entity::{Column, ColumnKind, Entity, EntityDescriptor, FieldValue};

pub const PROJECT_VISIBILITIES: &[&str] = &["public", "private", "team"];

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Project {
    pub project_id: String,
    pub project_name: String,
    pub description: Option<String>,
    pub visibility: String,
    pub owner_id: String,
    pub project_settings: Json<Value>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

pub struct NewProjectParams {
    pub project_name: String,
    pub description: Option<String>,
    pub visibility: Option<String>,
    pub owner_id: String,
    pub project_settings: Option<Value>,
}

impl Project {
    pub fn new(params: NewProjectParams) -> Self {
        Self {
            project_id: Uuid::new_v4().to_string(),
            project_name: params.project_name,
            description: params.description,
            visibility: params.visibility.unwrap_or_else(|| "private".to_string()),
            owner_id: params.owner_id,
            project_settings: Json(params.project_settings.unwrap_or_else(|| Value::Object(Default::default()))),
            created_at: Utc::now(),
            modified_at: None,
        }
    }
}

impl Entity for Project {
    const DESCRIPTOR: &'static EntityDescriptor = &EntityDescriptor {
        label: "Project",
        table: "projects",
        key: "project_id",
        order_by: "created_at",
        columns: &[
            Column::fixed("project_id", ColumnKind::Text),
            Column::editable("project_name", ColumnKind::Text),
            Column::editable("description", ColumnKind::Text),
            Column::editable("visibility", ColumnKind::Text),
            Column::fixed("owner_id", ColumnKind::Text),
            Column::editable("project_settings", ColumnKind::Json),
            Column::fixed("created_at", ColumnKind::Timestamp),
            Column::fixed("modified_at", ColumnKind::Timestamp),
        ],
    };

    fn key(&self) -> &str {
        &self.project_id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.project_id.clone().into(),
            self.project_name.clone().into(),
            self.description.clone().into(),
            self.visibility.clone().into(),
            self.owner_id.clone().into(),
            self.project_settings.0.clone().into(),
            self.created_at.into(),
            self.modified_at.into(),
        ]
    }
}
