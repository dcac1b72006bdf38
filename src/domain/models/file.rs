use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::entity::{Column, ColumnKind, Entity, EntityDescriptor, FieldValue};

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct File {
    pub file_id: String,
    pub project_id: String,
    pub directory_id: String,
    pub file_name: String,
    pub file_type_id: Option<String>,
    pub size_in_bytes: i64,
    pub storage_link: Option<String>,
    pub created_by: String,
    pub last_modified_by: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct NewFile {
    pub directory_id: String,
    pub file_name: String,
    pub file_type_id: Option<String>,
    #[serde(default)]
    pub size_in_bytes: i64,
    pub storage_link: Option<String>,
    pub created_by: String,
}

impl File {
    /// The file inherits its project from the containing directory.
    pub fn new(draft: NewFile, project_id: String) -> Self {
        Self {
            file_id: Uuid::new_v4().to_string(),
            project_id,
            directory_id: draft.directory_id,
            file_name: draft.file_name,
            file_type_id: draft.file_type_id,
            size_in_bytes: draft.size_in_bytes,
            storage_link: draft.storage_link,
            last_modified_by: draft.created_by.clone(),
            created_by: draft.created_by,
            created_at: Utc::now(),
            modified_at: None,
        }
    }
}

impl Entity for File {
    const DESCRIPTOR: &'static EntityDescriptor = &EntityDescriptor {
        label: "File",
        table: "files",
        key: "file_id",
        order_by: "created_at",
        columns: &[
            Column::fixed("file_id", ColumnKind::Text),
            Column::fixed("project_id", ColumnKind::Text),
            Column::fixed("directory_id", ColumnKind::Text),
            Column::editable("file_name", ColumnKind::Text),
            Column::editable("file_type_id", ColumnKind::Text),
            Column::editable("size_in_bytes", ColumnKind::Integer),
            Column::editable("storage_link", ColumnKind::Text),
            Column::fixed("created_by", ColumnKind::Text),
            Column::editable("last_modified_by", ColumnKind::Text),
            Column::fixed("created_at", ColumnKind::Timestamp),
            Column::fixed("modified_at", ColumnKind::Timestamp),
        ],
    };

    fn key(&self) -> &str {
        &self.file_id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.file_id.clone().into(),
            self.project_id.clone().into(),
            self.directory_id.clone().into(),
            self.file_name.clone().into(),
            self.file_type_id.clone().into(),
            self.size_in_bytes.into(),
            self.storage_link.clone().into(),
            self.created_by.clone().into(),
            self.last_modified_by.clone().into(),
            self.created_at.into(),
            self.modified_at.into(),
        ]
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct FileVersion {
    pub version_id: String,
    pub file_id: String,
    pub version_number: i64,
    pub version_link: Option<String>,
    pub size_in_bytes: i64,
    pub parent_version_id: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewFileVersion {
    pub file_id: String,
    pub version_number: i64,
    pub version_link: Option<String>,
    pub size_in_bytes: i64,
    pub parent_version_id: Option<String>,
    pub created_by: String,
}

impl FileVersion {
    pub fn new(draft: NewFileVersion) -> Self {
        Self {
            version_id: Uuid::new_v4().to_string(),
            file_id: draft.file_id,
            version_number: draft.version_number,
            version_link: draft.version_link,
            size_in_bytes: draft.size_in_bytes,
            parent_version_id: draft.parent_version_id,
            created_by: draft.created_by,
            created_at: Utc::now(),
        }
    }
}

impl Entity for FileVersion {
    const DESCRIPTOR: &'static EntityDescriptor = &EntityDescriptor {
        label: "File version",
        table: "file_versions",
        key: "version_id",
        order_by: "created_at",
        columns: &[
            Column::fixed("version_id", ColumnKind::Text),
            Column::fixed("file_id", ColumnKind::Text),
            Column::fixed("version_number", ColumnKind::Integer),
            Column::editable("version_link", ColumnKind::Text),
            Column::fixed("size_in_bytes", ColumnKind::Integer),
            Column::fixed("parent_version_id", ColumnKind::Text),
            Column::fixed("created_by", ColumnKind::Text),
            Column::fixed("created_at", ColumnKind::Timestamp),
        ],
    };

    fn key(&self) -> &str {
        &self.version_id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.version_id.clone().into(),
            self.file_id.clone().into(),
            self.version_number.into(),
            self.version_link.clone().into(),
            self.size_in_bytes.into(),
            self.parent_version_id.clone().into(),
            self.created_by.clone().into(),
            self.created_at.into(),
        ]
    }
}
