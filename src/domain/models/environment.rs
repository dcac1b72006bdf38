use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};

use crate::domain::entity::{Column, ColumnKind, Entity, EntityDescriptor, FieldValue};

pub const DEFAULT_TIMEOUT_SECONDS: i64 = 30;

/// Runtime image description. Only stored; nothing here launches containers.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ExecutionEnvironment {
    pub environment_id: String,
    pub environment_name: String,
    pub language: String,
    pub version: Option<String>,
    pub docker_image: Option<String>,
    pub base_packages: Json<Value>,
    pub setup_commands: Json<Value>,
    pub run_command_template: Option<String>,
    pub timeout_seconds: i64,
    pub persistent_storage: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewExecutionEnvironment {
    pub environment_name: String,
    pub language: String,
    pub version: Option<String>,
    pub docker_image: Option<String>,
    pub base_packages: Option<Value>,
    pub setup_commands: Option<Value>,
    pub run_command_template: Option<String>,
    pub timeout_seconds: Option<i64>,
    #[serde(default)]
    pub persistent_storage: bool,
}

impl ExecutionEnvironment {
    pub fn new(draft: NewExecutionEnvironment) -> Self {
        Self {
            environment_id: Uuid::new_v4().to_string(),
            environment_name: draft.environment_name,
            language: draft.language,
            version: draft.version,
            docker_image: draft.docker_image,
            base_packages: Json(draft.base_packages.unwrap_or_else(|| Value::Array(Vec::new()))),
            setup_commands: Json(draft.setup_commands.unwrap_or_else(|| Value::Array(Vec::new()))),
            run_command_template: draft.run_command_template,
            timeout_seconds: draft.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            persistent_storage: draft.persistent_storage,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

impl Entity for ExecutionEnvironment {
    const DESCRIPTOR: &'static EntityDescriptor = &EntityDescriptor {
        label: "Execution environment",
        table: "execution_environments",
        key: "environment_id",
        order_by: "created_at",
        columns: &[
            Column::fixed("environment_id", ColumnKind::Text),
            Column::editable("environment_name", ColumnKind::Text),
            Column::editable("language", ColumnKind::Text),
            Column::editable("version", ColumnKind::Text),
            Column::editable("docker_image", ColumnKind::Text),
            Column::editable("base_packages", ColumnKind::Json),
            Column::editable("setup_commands", ColumnKind::Json),
            Column::editable("run_command_template", ColumnKind::Text),
            Column::editable("timeout_seconds", ColumnKind::Integer),
            Column::editable("persistent_storage", ColumnKind::Bool),
            Column::editable("is_active", ColumnKind::Bool),
            Column::fixed("created_at", ColumnKind::Timestamp),
        ],
    };

    fn key(&self) -> &str {
        &self.environment_id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.environment_id.clone().into(),
            self.environment_name.clone().into(),
            self.language.clone().into(),
            self.version.clone().into(),
            self.docker_image.clone().into(),
            self.base_packages.0.clone().into(),
            self.setup_commands.0.clone().into(),
            self.run_command_template.clone().into(),
            self.timeout_seconds.into(),
            self.persistent_storage.into(),
            self.is_active.into(),
            self.created_at.into(),
        ]
    }
}

/// A user's terminal session inside a project, bound to an execution environment.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct TerminalEnvironment {
    pub terminal_id: String,
    pub project_id: String,
    pub user_id: String,
    pub environment_id: String,
    pub container_id: String,
    pub websocket_id: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewTerminalEnvironment {
    pub project_id: String,
    pub user_id: String,
    pub environment_id: String,
    pub container_id: String,
    pub websocket_id: String,
}

impl TerminalEnvironment {
    pub fn new(draft: NewTerminalEnvironment) -> Self {
        Self {
            terminal_id: Uuid::new_v4().to_string(),
            project_id: draft.project_id,
            user_id: draft.user_id,
            environment_id: draft.environment_id,
            container_id: draft.container_id,
            websocket_id: draft.websocket_id,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

impl Entity for TerminalEnvironment {
    const DESCRIPTOR: &'static EntityDescriptor = &EntityDescriptor {
        label: "Terminal environment",
        table: "terminal_environments",
        key: "terminal_id",
        order_by: "created_at",
        columns: &[
            Column::fixed("terminal_id", ColumnKind::Text),
            Column::fixed("project_id", ColumnKind::Text),
            Column::fixed("user_id", ColumnKind::Text),
            Column::fixed("environment_id", ColumnKind::Text),
            Column::editable("container_id", ColumnKind::Text),
            Column::editable("websocket_id", ColumnKind::Text),
            Column::editable("is_active", ColumnKind::Bool),
            Column::fixed("created_at", ColumnKind::Timestamp),
        ],
    };

    fn key(&self) -> &str {
        &self.terminal_id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.terminal_id.clone().into(),
            self.project_id.clone().into(),
            self.user_id.clone().into(),
            self.environment_id.clone().into(),
            self.container_id.clone().into(),
            self.websocket_id.clone().into(),
            self.is_active.into(),
            self.created_at.into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_defaults() {
        let env = ExecutionEnvironment::new(NewExecutionEnvironment {
            environment_name: "python-3.12".into(),
            language: "python".into(),
            version: Some("3.12".into()),
            docker_image: None,
            base_packages: None,
            setup_commands: None,
            run_command_template: None,
            timeout_seconds: None,
            persistent_storage: false,
        });
        assert_eq!(env.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
        assert_eq!(env.base_packages.0, Value::Array(Vec::new()));
        assert!(env.is_active);
        assert_eq!(env.values().len(), ExecutionEnvironment::DESCRIPTOR.columns.len());
    }
}
