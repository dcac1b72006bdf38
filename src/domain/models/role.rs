use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};

use crate::domain::entity::{Column, ColumnKind, Entity, EntityDescriptor, FieldValue};

/// Role name that marks the implicit owner entry in member listings.
pub const OWNER_ROLE_NAME: &str = "Owner";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Role {
    pub role_id: String,
    pub role_name: String,
    pub description: Option<String>,
    pub permissions: Json<Value>,
    pub created_at: DateTime<Utc>,
}

impl Role {
    pub fn new(role_name: String, description: Option<String>, permissions: Option<Value>) -> Self {
        Self {
            role_id: Uuid::new_v4().to_string(),
            role_name,
            description,
            permissions: Json(permissions.unwrap_or_else(|| Value::Object(Default::default()))),
            created_at: Utc::now(),
        }
    }
}

/// Permissions are a flat mapping of permission name to boolean.
pub fn validate_permissions(permissions: &Value) -> Result<(), String> {
    let map = permissions
        .as_object()
        .ok_or_else(|| "permissions must be an object".to_string())?;
    match map.iter().find(|(_, v)| !v.is_boolean()) {
        Some((name, _)) => Err(format!("permission '{}' must be true or false", name)),
        None => Ok(()),
    }
}

impl Entity for Role {
    const DESCRIPTOR: &'static EntityDescriptor = &EntityDescriptor {
        label: "Role",
        table: "roles",
        key: "role_id",
        order_by: "created_at",
        columns: &[
            Column::fixed("role_id", ColumnKind::Text),
            Column::fixed("role_name", ColumnKind::Text),
            Column::editable("description", ColumnKind::Text),
            Column::editable("permissions", ColumnKind::Json),
            Column::fixed("created_at", ColumnKind::Timestamp),
        ],
    };

    fn key(&self) -> &str {
        &self.role_id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.role_id.clone().into(),
            self.role_name.clone().into(),
            self.description.clone().into(),
            self.permissions.0.clone().into(),
            self.created_at.into(),
        ]
    }
}
