use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};

use crate::domain::entity::{Column, ColumnKind, Entity, EntityDescriptor, FieldValue};

pub const CONNECTION_TYPES: &[&str] = &["editor", "terminal", "preview"];

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct WebSocketConnection {
    pub connection_id: String,
    pub user_id: String,
    pub websocket_id: String,
    pub project_id: Option<String>,
    pub connection_type: String,
    pub client_info: Json<Value>,
    pub is_active: bool,
    pub connected_at: DateTime<Utc>,
    pub last_ping: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct NewWebSocketConnection {
    pub user_id: String,
    pub websocket_id: String,
    pub project_id: Option<String>,
    pub connection_type: Option<String>,
    pub client_info: Option<Value>,
}

impl WebSocketConnection {
    pub fn new(draft: NewWebSocketConnection) -> Self {
        let now = Utc::now();
        Self {
            connection_id: Uuid::new_v4().to_string(),
            user_id: draft.user_id,
            websocket_id: draft.websocket_id,
            project_id: draft.project_id,
            connection_type: draft.connection_type.unwrap_or_else(|| "editor".to_string()),
            client_info: Json(draft.client_info.unwrap_or_else(|| Value::Object(Default::default()))),
            is_active: true,
            connected_at: now,
            last_ping: Some(now),
        }
    }
}

impl Entity for WebSocketConnection {
    const DESCRIPTOR: &'static EntityDescriptor = &EntityDescriptor {
        label: "Connection",
        table: "websocket_connections",
        key: "connection_id",
        order_by: "connected_at",
        columns: &[
            Column::fixed("connection_id", ColumnKind::Text),
            Column::fixed("user_id", ColumnKind::Text),
            Column::fixed("websocket_id", ColumnKind::Text),
            Column::fixed("project_id", ColumnKind::Text),
            Column::fixed("connection_type", ColumnKind::Text),
            Column::editable("client_info", ColumnKind::Json),
            Column::editable("is_active", ColumnKind::Bool),
            Column::fixed("connected_at", ColumnKind::Timestamp),
            Column::editable("last_ping", ColumnKind::Timestamp),
        ],
    };

    fn key(&self) -> &str {
        &self.connection_id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.connection_id.clone().into(),
            self.user_id.clone().into(),
            self.websocket_id.clone().into(),
            self.project_id.clone().into(),
            self.connection_type.clone().into(),
            self.client_info.0.clone().into(),
            self.is_active.into(),
            self.connected_at.into(),
            self.last_ping.into(),
        ]
    }
}
