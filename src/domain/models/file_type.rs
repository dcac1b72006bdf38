use serde::{Deserialize, Serialize};
use uuid::Uuid;
use sqlx::FromRow;

use crate::domain::entity::{Column, ColumnKind, Entity, EntityDescriptor, FieldValue};

/// Editor metadata for a kind of file, referenced by `File::file_type_id`.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct FileType {
    pub file_type_id: String,
    pub type_name: String,
    pub extension: String,
    pub mime_type: String,
    pub icon_class: Option<String>,
    pub syntax_mode: Option<String>,
    pub is_executable: bool,
    pub is_binary: bool,
    pub default_content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewFileType {
    pub type_name: String,
    pub extension: String,
    pub mime_type: String,
    pub icon_class: Option<String>,
    pub syntax_mode: Option<String>,
    #[serde(default)]
    pub is_executable: bool,
    #[serde(default)]
    pub is_binary: bool,
    pub default_content: Option<String>,
}

impl FileType {
    pub fn new(draft: NewFileType) -> Self {
        Self {
            file_type_id: Uuid::new_v4().to_string(),
            type_name: draft.type_name,
            extension: draft.extension,
            mime_type: draft.mime_type,
            icon_class: draft.icon_class,
            syntax_mode: draft.syntax_mode,
            is_executable: draft.is_executable,
            is_binary: draft.is_binary,
            default_content: draft.default_content,
        }
    }
}

impl Entity for FileType {
    const DESCRIPTOR: &'static EntityDescriptor = &EntityDescriptor {
        label: "File type",
        table: "file_types",
        key: "file_type_id",
        order_by: "type_name",
        columns: &[
            Column::fixed("file_type_id", ColumnKind::Text),
            Column::editable("type_name", ColumnKind::Text),
            Column::editable("extension", ColumnKind::Text),
            Column::editable("mime_type", ColumnKind::Text),
            Column::editable("icon_class", ColumnKind::Text),
            Column::editable("syntax_mode", ColumnKind::Text),
            Column::editable("is_executable", ColumnKind::Bool),
            Column::editable("is_binary", ColumnKind::Bool),
            Column::editable("default_content", ColumnKind::Text),
        ],
    };

    fn key(&self) -> &str {
        &self.file_type_id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.file_type_id.clone().into(),
            self.type_name.clone().into(),
            self.extension.clone().into(),
            self.mime_type.clone().into(),
            self.icon_class.clone().into(),
            self.syntax_mode.clone().into(),
            self.is_executable.into(),
            self.is_binary.into(),
            self.default_content.clone().into(),
        ]
    }
}
