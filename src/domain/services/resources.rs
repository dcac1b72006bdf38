//! Workspace records served through the generic CRUD endpoints.

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::entity::{Entity, FieldValue, Patch};
use crate::domain::models::connection::{NewWebSocketConnection, WebSocketConnection, CONNECTION_TYPES};
use crate::domain::models::directory::{Directory, NewDirectory};
use crate::domain::models::environment::{
    ExecutionEnvironment, NewExecutionEnvironment, NewTerminalEnvironment, TerminalEnvironment,
};
use crate::domain::models::file::{File, FileVersion, NewFile, NewFileVersion};
use crate::domain::models::file_type::{FileType, NewFileType};
use crate::domain::models::notification::{NewNotification, Notification, NOTIFICATION_TYPES};
use crate::domain::models::project::Project;
use crate::domain::models::user::User;
use crate::error::AppError;
use crate::infra::store::Store;

/// An entity creatable from a request draft.
#[async_trait]
pub trait Resource: Entity {
    type Draft: DeserializeOwned + Send + 'static;

    /// Validates the draft against stored state and builds the record.
    async fn from_draft(store: &Store, draft: Self::Draft) -> Result<Self, AppError>;

    /// Checks an update against stored state before it is written.
    async fn validate_patch(_store: &Store, _patch: &Patch) -> Result<(), AppError> {
        Ok(())
    }

    /// Hook for columns maintained on every update.
    fn stamp(patch: Patch) -> Patch {
        patch
    }
}

async fn require<E: Entity>(store: &Store, key: &str) -> Result<E, AppError> {
    store.get::<E>(key).await?.ok_or_else(|| E::DESCRIPTOR.not_found())
}

fn one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), AppError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{} must be one of: {}",
            field,
            allowed.join(", ")
        )))
    }
}

#[async_trait]
impl Resource for Directory {
    type Draft = NewDirectory;

    async fn from_draft(store: &Store, draft: NewDirectory) -> Result<Self, AppError> {
        if draft.directory_name.is_empty() || draft.directory_name.contains('/') {
            return Err(AppError::Validation("Directory name must be non-empty and contain no '/'".into()));
        }
        require::<Project>(store, &draft.project_id).await?;
        require::<User>(store, &draft.created_by).await?;

        let parent = match &draft.parent_directory_id {
            Some(parent_id) => {
                let parent = store
                    .get::<Directory>(parent_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Parent directory not found".into()))?;
                if parent.project_id != draft.project_id {
                    return Err(AppError::Validation("Parent directory belongs to another project".into()));
                }
                Some(parent)
            }
            None => None,
        };

        Ok(Directory::new(draft, parent.as_ref()))
    }
}

#[async_trait]
impl Resource for File {
    type Draft = NewFile;

    async fn from_draft(store: &Store, draft: NewFile) -> Result<Self, AppError> {
        if draft.size_in_bytes < 0 {
            return Err(AppError::Validation("size_in_bytes must not be negative".into()));
        }
        let directory = require::<Directory>(store, &draft.directory_id).await?;
        require::<User>(store, &draft.created_by).await?;
        if let Some(file_type_id) = &draft.file_type_id {
            require::<FileType>(store, file_type_id).await?;
        }
        Ok(File::new(draft, directory.project_id))
    }

    async fn validate_patch(store: &Store, patch: &Patch) -> Result<(), AppError> {
        if let Some(FieldValue::Text(Some(file_type_id))) = patch.get("file_type_id") {
            require::<FileType>(store, file_type_id).await?;
        }
        if let Some(FieldValue::Text(Some(user_id))) = patch.get("last_modified_by") {
            require::<User>(store, user_id).await?;
        }
        if let Some(FieldValue::Integer(Some(size))) = patch.get("size_in_bytes")
            && *size < 0
        {
            return Err(AppError::Validation("size_in_bytes must not be negative".into()));
        }
        Ok(())
    }

    fn stamp(patch: Patch) -> Patch {
        patch.set("modified_at", Utc::now())
    }
}

#[async_trait]
impl Resource for FileVersion {
    type Draft = NewFileVersion;

    async fn from_draft(store: &Store, draft: NewFileVersion) -> Result<Self, AppError> {
        if draft.version_number < 1 {
            return Err(AppError::Validation("version_number must be at least 1".into()));
        }
        require::<File>(store, &draft.file_id).await?;
        require::<User>(store, &draft.created_by).await?;
        if let Some(parent_id) = &draft.parent_version_id {
            let parent = require::<FileVersion>(store, parent_id).await?;
            if parent.file_id != draft.file_id {
                return Err(AppError::Validation("Parent version belongs to another file".into()));
            }
        }
        Ok(FileVersion::new(draft))
    }
}

#[async_trait]
impl Resource for Notification {
    type Draft = NewNotification;

    async fn from_draft(store: &Store, draft: NewNotification) -> Result<Self, AppError> {
        one_of("notification_type", &draft.notification_type, NOTIFICATION_TYPES)?;
        require::<User>(store, &draft.user_id).await?;
        if let Some(project_id) = &draft.project_id {
            require::<Project>(store, project_id).await?;
        }
        Ok(Notification::new(draft))
    }
}

#[async_trait]
impl Resource for WebSocketConnection {
    type Draft = NewWebSocketConnection;

    async fn from_draft(store: &Store, draft: NewWebSocketConnection) -> Result<Self, AppError> {
        if let Some(kind) = &draft.connection_type {
            one_of("connection_type", kind, CONNECTION_TYPES)?;
        }
        require::<User>(store, &draft.user_id).await?;
        if let Some(project_id) = &draft.project_id {
            require::<Project>(store, project_id).await?;
        }
        Ok(WebSocketConnection::new(draft))
    }
}

#[async_trait]
impl Resource for FileType {
    type Draft = NewFileType;

    async fn from_draft(_store: &Store, draft: NewFileType) -> Result<Self, AppError> {
        if draft.type_name.trim().is_empty() {
            return Err(AppError::Validation("type_name must not be empty".into()));
        }
        if draft.extension.trim().is_empty() || draft.mime_type.trim().is_empty() {
            return Err(AppError::Validation("extension and mime_type are required".into()));
        }
        Ok(FileType::new(draft))
    }
}

fn check_list(field: &str, value: Option<&Value>) -> Result<(), AppError> {
    match value {
        Some(v) if !v.is_array() => Err(AppError::Validation(format!("{} must be a list", field))),
        _ => Ok(()),
    }
}

fn check_timeout(seconds: Option<i64>) -> Result<(), AppError> {
    match seconds {
        Some(s) if s <= 0 => Err(AppError::Validation("timeout_seconds must be positive".into())),
        _ => Ok(()),
    }
}

#[async_trait]
impl Resource for ExecutionEnvironment {
    type Draft = NewExecutionEnvironment;

    async fn from_draft(_store: &Store, draft: NewExecutionEnvironment) -> Result<Self, AppError> {
        if draft.environment_name.trim().is_empty() || draft.language.trim().is_empty() {
            return Err(AppError::Validation("environment_name and language are required".into()));
        }
        check_list("base_packages", draft.base_packages.as_ref())?;
        check_list("setup_commands", draft.setup_commands.as_ref())?;
        check_timeout(draft.timeout_seconds)?;
        Ok(ExecutionEnvironment::new(draft))
    }

    async fn validate_patch(_store: &Store, patch: &Patch) -> Result<(), AppError> {
        for field in ["base_packages", "setup_commands"] {
            if let Some(FieldValue::Json(v)) = patch.get(field) {
                check_list(field, Some(v))?;
            }
        }
        match patch.get("timeout_seconds") {
            Some(FieldValue::Integer(None)) => {
                return Err(AppError::Validation("timeout_seconds must not be null".into()));
            }
            Some(FieldValue::Integer(seconds)) => check_timeout(*seconds)?,
            _ => {}
        }
        Ok(())
    }
}

#[async_trait]
impl Resource for TerminalEnvironment {
    type Draft = NewTerminalEnvironment;

    async fn from_draft(store: &Store, draft: NewTerminalEnvironment) -> Result<Self, AppError> {
        require::<Project>(store, &draft.project_id).await?;
        require::<User>(store, &draft.user_id).await?;
        let environment = require::<ExecutionEnvironment>(store, &draft.environment_id).await?;
        if !environment.is_active {
            return Err(AppError::Validation("Execution environment is not active".into()));
        }
        Ok(TerminalEnvironment::new(draft))
    }
}
